// ABOUTME: Bounded macro fixer restoring exact per-macro sums after first-pass allocation
// ABOUTME: Spends deltas on neutral, then preset, then user-bounded slots; weakens presets before giving up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Bounded Macro Fixer
//!
//! Macros are fixed in the order carbs, fat, protein so per-meal protein
//! floors are the last thing touched. For each macro the delta between the
//! target and the current sum is distributed tier by tier:
//!
//! 1. slots whose bound has no provenance
//! 2. preset-bounded slots, within their bounds
//! 3. user-bounded slots, within their bounds
//! 4. preset-bounded slots relaxed one at a time in time order, earliest
//!    first, each just far enough to take what is left (`PRESET_WEAKENED`),
//!    unless auto-fix is off
//!
//! Whatever is left is reported as `<MACRO>_UNACHIEVABLE_WITH_LIMITS`.
//! User bounds are never relaxed.

use super::splitter::split;
use super::{macro_sum, stage_seed, Journal, StageContext};
use macroplan_core::models::{
    AutoFixLevel, BoundSource, ChangeLogEntry, Macro, MacroBound, Slot, SlotBounds, Warning,
    WarningCode,
};
use serde_json::json;
use tracing::debug;

/// Resolution order
pub const FIX_ORDER: [Macro; 3] = [Macro::Carbs, Macro::Fat, Macro::Protein];

/// Result of the fixer stage
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Slots with corrected macro sums
    pub slots: Vec<Slot>,
    /// Bounds after any preset weakening
    pub bounds: Vec<SlotBounds>,
    /// Macros whose target could not be met
    pub unachievable: Vec<Macro>,
}

/// Direction of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn capacity(self, bound: &MacroBound, grams: u32) -> u32 {
        match self {
            Self::Add => bound.headroom(grams),
            Self::Remove => bound.slack(grams),
        }
    }

    const fn apply(self, grams: u32, amount: u32) -> u32 {
        match self {
            Self::Add => grams.saturating_add(amount),
            Self::Remove => grams.saturating_sub(amount),
        }
    }
}

/// One distribution request
pub(crate) struct Distribution<'a> {
    pub nutrient: Macro,
    pub direction: Direction,
    pub indices: &'a [usize],
    pub step: u32,
    pub seed: u64,
    pub max_rounds: u32,
}

/// Spread `amount` grams over `indices` in `step` chunks, then place the residue
///
/// Chunks are split evenly with the seeded splitter each round and capped by
/// each slot's capacity. A sub-step residue lands on one slot with room for
/// all of it, otherwise it is spread greedily. Returns the grams that could
/// not be placed.
pub(crate) fn distribute(
    slots: &mut [Slot],
    bounds: &[SlotBounds],
    request: &Distribution<'_>,
    amount: u32,
) -> u32 {
    let Distribution {
        nutrient,
        direction,
        indices,
        step,
        seed,
        max_rounds,
    } = *request;
    let step = step.max(1);
    let capacity = |slots: &[Slot], i: usize| {
        direction.capacity(&bounds[i].get(nutrient), slots[i].macros.get(nutrient))
    };
    let mut remaining = amount;

    for round in 0..max_rounds {
        if remaining < step {
            break;
        }
        let eligible: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| capacity(slots, i) >= step)
            .collect();
        if eligible.is_empty() {
            break;
        }
        let units = split(
            remaining / step,
            &vec![1.0; eligible.len()],
            stage_seed(seed, u64::from(round)),
        );
        let mut moved = 0;
        for (&i, share) in eligible.iter().zip(units) {
            let take = share.min(capacity(slots, i) / step) * step;
            let grams = direction.apply(slots[i].macros.get(nutrient), take);
            slots[i].macros.set(nutrient, grams);
            moved += take;
        }
        if moved == 0 {
            break;
        }
        remaining -= moved;
    }

    if remaining == 0 {
        return 0;
    }
    if let Some(&i) = indices.iter().find(|&&i| capacity(slots, i) >= remaining) {
        let grams = direction.apply(slots[i].macros.get(nutrient), remaining);
        slots[i].macros.set(nutrient, grams);
        return 0;
    }
    for &i in indices {
        let take = capacity(slots, i).min(remaining);
        if take > 0 {
            let grams = direction.apply(slots[i].macros.get(nutrient), take);
            slots[i].macros.set(nutrient, grams);
            remaining -= take;
        }
        if remaining == 0 {
            break;
        }
    }
    remaining
}

fn tier(bounds: &[SlotBounds], nutrient: Macro, source: BoundSource) -> Vec<usize> {
    (0..bounds.len())
        .filter(|&i| bounds[i].get(nutrient).source == source)
        .collect()
}

/// Relax the preset side of a bound so a slot holding `grams` can move `needed` more
fn weaken(bound: &mut MacroBound, direction: Direction, grams: u32, needed: u32) -> bool {
    match direction {
        Direction::Add => {
            let relaxed = grams.saturating_add(needed);
            match bound.max {
                Some(max) if relaxed > max => {
                    bound.max = Some(relaxed);
                    true
                }
                _ => false,
            }
        }
        Direction::Remove => {
            let relaxed = grams.saturating_sub(needed);
            if relaxed < bound.min {
                bound.min = relaxed;
                true
            } else {
                false
            }
        }
    }
}

/// Restore exact per-macro sums within bounds
pub fn fix(
    slots: &[Slot],
    bounds: &[SlotBounds],
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) -> FixOutcome {
    let mut fixed = slots.to_vec();
    let mut bounds = bounds.to_vec();
    let mut unachievable = Vec::new();

    for (salt, nutrient) in (10_u64..).zip(FIX_ORDER) {
        let target = ctx.targets.get(nutrient);
        let current = macro_sum(&fixed, nutrient);
        if current == target {
            continue;
        }
        let (direction, mut remaining) = if target > current {
            (Direction::Add, target - current)
        } else {
            (Direction::Remove, current - target)
        };
        debug!(%nutrient, ?direction, delta = remaining, "fixing macro sum");

        for source in [BoundSource::None, BoundSource::Preset, BoundSource::User] {
            if remaining == 0 {
                break;
            }
            let indices = tier(&bounds, nutrient, source);
            let request = Distribution {
                nutrient,
                direction,
                indices: &indices,
                step: ctx.step(),
                seed: ctx.seed(salt),
                max_rounds: ctx.config.limits.distribution,
            };
            remaining = distribute(&mut fixed, &bounds, &request, remaining);
        }

        if remaining > 0 && ctx.inputs.auto_fix != AutoFixLevel::Off {
            remaining = weaken_presets(
                &mut fixed,
                &mut bounds,
                nutrient,
                direction,
                remaining,
                ctx,
                journal,
            );
        }

        if remaining > 0 {
            journal.warn(
                Warning::new(
                    WarningCode::unachievable(nutrient),
                    format!(
                        "{nutrient} target {target} g missed by {remaining} g under per-meal limits"
                    ),
                )
                .with_fix(format!(
                    "relax the {nutrient} limits or change the {nutrient} target"
                )),
            );
            unachievable.push(nutrient);
        }
    }

    FixOutcome {
        slots: fixed,
        bounds,
        unachievable,
    }
}

fn weaken_presets(
    slots: &mut [Slot],
    bounds: &mut [SlotBounds],
    nutrient: Macro,
    direction: Direction,
    mut remaining: u32,
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) -> u32 {
    let requested = remaining;
    let mut order = tier(bounds, nutrient, BoundSource::Preset);
    order.sort_by_key(|&i| (slots[i].time, i));

    let mut weakened = Vec::new();
    for i in order {
        if remaining == 0 {
            break;
        }
        let before = bounds[i].get(nutrient);
        let grams = slots[i].macros.get(nutrient);
        if !weaken(bounds[i].get_mut(nutrient), direction, grams, remaining) {
            continue;
        }
        journal.record(
            ChangeLogEntry::new(
                "fixer.weaken_preset",
                json!(before),
                json!(bounds[i].get(nutrient)),
                format!("{nutrient} preset bound relaxed to meet the daily target"),
            )
            .for_slot(slots[i].id.clone()),
        );
        let single = [i];
        let request = Distribution {
            nutrient,
            direction,
            indices: &single,
            step: ctx.step(),
            seed: ctx.seed(20),
            max_rounds: ctx.config.limits.distribution,
        };
        remaining = distribute(slots, bounds, &request, remaining);
        weakened.push(slots[i].id.clone());
    }
    if weakened.is_empty() {
        return remaining;
    }
    journal.warn(Warning::new(
        WarningCode::PresetWeakened,
        format!(
            "{nutrient} preset bound relaxed on {} to place {} g",
            weakened.join(", "),
            requested - remaining
        ),
    ));
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroplan_core::models::SlotRole;

    fn slots(n: usize) -> Vec<Slot> {
        (0..n)
            .map(|i| Slot::new(format!("main-{i}"), 480, "Meal", SlotRole::Main))
            .collect()
    }

    #[test]
    fn distribute_keeps_grid_and_places_residue_once() {
        let mut s = slots(3);
        let bounds = vec![SlotBounds::default(); 3];
        let request = Distribution {
            nutrient: Macro::Carbs,
            direction: Direction::Add,
            indices: &[0, 1, 2],
            step: 5,
            seed: 0,
            max_rounds: 16,
        };
        let left = distribute(&mut s, &bounds, &request, 33);
        assert_eq!(left, 0);
        assert_eq!(macro_sum(&s, Macro::Carbs), 33);
        let off_grid = s.iter().filter(|x| x.macros.carbs % 5 != 0).count();
        assert_eq!(off_grid, 1);
    }

    #[test]
    fn distribute_stops_at_capacity() {
        let mut s = slots(2);
        let capped = SlotBounds {
            fat: MacroBound::new(0, Some(10), BoundSource::User),
            ..SlotBounds::default()
        };
        let bounds = vec![capped; 2];
        let request = Distribution {
            nutrient: Macro::Fat,
            direction: Direction::Add,
            indices: &[0, 1],
            step: 5,
            seed: 3,
            max_rounds: 16,
        };
        let left = distribute(&mut s, &bounds, &request, 27);
        assert_eq!(left, 7);
        assert_eq!(macro_sum(&s, Macro::Fat), 20);
    }

    #[test]
    fn weaken_only_relaxes_the_needed_side_by_the_needed_amount() {
        let mut bound = MacroBound::new(20, Some(40), BoundSource::Preset);
        assert!(weaken(&mut bound, Direction::Add, 40, 15));
        assert_eq!(bound.max, Some(55));
        assert_eq!(bound.min, 20);
        // headroom already covers the request
        assert!(!weaken(&mut bound, Direction::Add, 40, 10));
        assert!(weaken(&mut bound, Direction::Remove, 25, 10));
        assert_eq!(bound.min, 15);
        assert!(!weaken(&mut bound, Direction::Remove, 25, 5));
    }
}
