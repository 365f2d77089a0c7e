// ABOUTME: Kcal reconciler closing the gap between summed slot energy and the kcal target
// ABOUTME: Uses fat steps for the 9-mod-4 parity, then carbs, then fat; leanPM spreads over late-free mains
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Kcal reconciler
//!
//! Fat carries 9 kcal/g and carbs 4 kcal/g. Since `9 ≡ 1 (mod 4)`, a
//! kcal delta that is not a multiple of 4 can only be closed by moving `k`
//! fat grams with `k ≡ delta (mod 4)`. The reconciler picks the smaller of
//! the two such `k` nearest zero, then closes the rest with carbs and
//! finally with fat. All moves respect slot bounds.

use super::fixer::{distribute, Direction, Distribution};
use super::{kcal_sum, macro_sum, Journal, StageContext};
use macroplan_core::constants::energy::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT};
use macroplan_core::models::{
    ChangeLogEntry, Macro, Preset, Slot, SlotBounds, SlotRole, Warning, WarningCode,
};
use serde_json::json;
use tracing::debug;

/// Result of the reconciler stage
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Slots after kcal reconciliation
    pub slots: Vec<Slot>,
    /// Whether the kcal target stayed out of tolerance
    pub kcal_unachievable: bool,
    /// Macros whose sum the reconciler changed; each carries a `MACRO_DRIFTED_FOR_KCAL` warning
    pub drifted: Vec<Macro>,
}

/// Signed kcal still missing from the plan
fn kcal_delta(slots: &[Slot], target: u32) -> i64 {
    i64::from(target) - i64::from(kcal_sum(slots))
}

/// Fat grams (signed) that make the remaining delta a multiple of 4 with the least leftover
#[must_use]
pub fn parity_fat_grams(delta: i64) -> [i64; 2] {
    let fat = i64::from(KCAL_PER_GRAM_FAT);
    let r = delta.rem_euclid(4);
    if r == 0 {
        return [0, 0];
    }
    let up = r;
    let down = r - 4;
    if (delta - fat * up).abs() <= (delta - fat * down).abs() {
        [up, down]
    } else {
        [down, up]
    }
}

struct Reconciler<'a, 'c> {
    slots: Vec<Slot>,
    bounds: &'a [SlotBounds],
    ctx: &'a StageContext<'c>,
    all: Vec<usize>,
}

impl Reconciler<'_, '_> {
    /// Move `grams` (signed) of `nutrient` over `indices`; returns the signed grams moved
    fn shift(
        &mut self,
        nutrient: Macro,
        grams: i64,
        indices: &[usize],
        step: u32,
        salt: u64,
    ) -> i64 {
        if grams == 0 {
            return 0;
        }
        let direction = if grams > 0 {
            Direction::Add
        } else {
            Direction::Remove
        };
        let amount = u32::try_from(grams.unsigned_abs()).unwrap_or(u32::MAX);
        let request = Distribution {
            nutrient,
            direction,
            indices,
            step,
            seed: self.ctx.seed(salt),
            max_rounds: self.ctx.config.limits.distribution,
        };
        let left = distribute(&mut self.slots, self.bounds, &request, amount);
        let moved = i64::from(amount - left);
        if grams > 0 {
            moved
        } else {
            -moved
        }
    }

    fn delta(&self) -> i64 {
        kcal_delta(&self.slots, self.ctx.targets.kcal)
    }

    fn spread_lean_pm(&mut self) {
        let eligible: Vec<usize> = (0..self.slots.len())
            .filter(|&i| {
                let slot = &self.slots[i];
                slot.role == SlotRole::Main && !slot.is_anchor() && !slot.explicit_zero
            })
            .collect();
        let grams = self.delta() / i64::from(KCAL_PER_GRAM_FAT);
        self.shift(Macro::Fat, grams, &eligible, 1, 30);
    }

    fn fix_parity(&mut self) {
        let all = self.all.clone();
        for grams in parity_fat_grams(self.delta()) {
            if grams == 0 {
                return;
            }
            let moved = self.shift(Macro::Fat, grams, &all, 1, 31);
            if moved == grams {
                return;
            }
            // a partial move breaks parity; put it back before trying the other direction
            self.shift(Macro::Fat, -moved, &all, 1, 31);
        }
    }

    fn close_with(&mut self, nutrient: Macro, per_gram: u32, salt: u64) {
        let all = self.all.clone();
        let grams = self.delta() / i64::from(per_gram);
        self.shift(nutrient, grams, &all, self.ctx.step(), salt);
    }
}

/// Bring Σkcal within the configured tolerance of the kcal target where bounds allow
pub fn reconcile(
    slots: &[Slot],
    bounds: &[SlotBounds],
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) -> ReconcileOutcome {
    let tolerance = i64::from(ctx.config.allocation.kcal_tolerance);
    let before = kcal_sum(slots);
    let sums_before = Macro::ALL.map(|m| macro_sum(slots, m));
    let mut run = Reconciler {
        slots: slots.to_vec(),
        bounds,
        ctx,
        all: (0..slots.len()).collect(),
    };

    if run.delta().abs() > tolerance {
        if ctx.preset == Preset::LeanPm {
            run.spread_lean_pm();
        }
        if run.delta().abs() > tolerance {
            run.fix_parity();
        }
        if run.delta().abs() > tolerance {
            run.close_with(Macro::Carbs, KCAL_PER_GRAM_CARBS, 32);
        }
        if run.delta().abs() > tolerance {
            run.close_with(Macro::Fat, KCAL_PER_GRAM_FAT, 33);
        }
    }

    let delta = run.delta();
    let slots = run.slots;
    let after = kcal_sum(&slots);
    if after != before {
        journal.record(ChangeLogEntry::new(
            "reconciler.kcal",
            json!(before),
            json!(after),
            format!("kcal target {}", ctx.targets.kcal),
        ));
    }

    let kcal_unachievable = delta.abs() > tolerance;
    if kcal_unachievable {
        journal.warn(
            Warning::new(
                WarningCode::KcalTargetUnachievableWithLimits,
                format!(
                    "plan is {delta:+} kcal from the {} kcal target after reconciliation",
                    ctx.targets.kcal
                ),
            )
            .with_fix("relax per-meal fat or carbohydrate limits"),
        );
    }

    let drifted: Vec<Macro> = Macro::ALL
        .into_iter()
        .zip(sums_before)
        .filter(|&(m, sum)| macro_sum(&slots, m) != sum)
        .map(|(m, _)| m)
        .collect();
    for &nutrient in &drifted {
        let target = ctx.targets.get(nutrient);
        let sum = macro_sum(&slots, nutrient);
        journal.record(ChangeLogEntry::new(
            "reconciler.drift",
            json!(target),
            json!(sum),
            format!("{nutrient} moved off its gram target to meet kcal"),
        ));
        journal.warn(
            Warning::new(
                WarningCode::MacroDriftedForKcal,
                format!("{nutrient} total is {sum} g against a {target} g target to meet kcal"),
            )
            .with_fix(format!("relax the limits blocking {nutrient} or change the kcal target")),
        );
    }
    debug!(kcal = after, delta, drifted = drifted.len(), "kcal reconciled");

    ReconcileOutcome {
        slots,
        kcal_unachievable,
        drifted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_prefers_smaller_leftover() {
        // delta 6: +2 g fat leaves -12, -2 g leaves +24
        assert_eq!(parity_fat_grams(6), [2, -2]);
        // delta 3: +3 g leaves -24, -1 g leaves +12
        assert_eq!(parity_fat_grams(3), [-1, 3]);
        assert_eq!(parity_fat_grams(-5), [-1, 3]);
        assert_eq!(parity_fat_grams(8), [0, 0]);
    }

    #[test]
    fn parity_leftover_is_a_multiple_of_four() {
        for delta in -40..=40_i64 {
            for k in parity_fat_grams(delta) {
                assert_eq!((delta - 9 * k).rem_euclid(4), 0, "delta {delta} k {k}");
            }
        }
    }
}
