// ABOUTME: Macro allocator giving each slot protein, carbohydrate and fat grams on the 5 g grid
// ABOUTME: Protein by clamped water-filling with role floors, carbs by preset weights, fat evenly with caps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Macro Allocator
//!
//! First-pass allocation. Totals are close to the targets but only the
//! fixer guarantees exact sums; every value leaving this stage is clamped
//! into its slot bounds.
//!
//! - **Protein**: every slot gets a common level `L`, raised to the slot's
//!   floor (0.30 g/kg around training, 0.45 g/kg before sleep, user or
//!   preset minimums). `L` is found by bisection so the ideal shares sum to
//!   the target, which funds the floors from the other slots proportionally.
//!   Grid rounding corrects the free slots first and the sleep slot last.
//! - **Carbohydrate**: preset weights through the seeded splitter.
//! - **Fat**: pre/post-workout slots get at most the peri-workout cap, the
//!   remainder is split evenly over the other slots. `leanPM` and the
//!   evening fat limit then move fat off capped slots.

use super::bounds::{floor_to_step, lean_pm_capped, peri_workout_fat_cap};
use super::presets::carb_weights;
use super::splitter::split_on_grid;
use super::{Journal, StageContext};
use macroplan_core::constants::energy::{
    KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN,
};
use macroplan_core::models::{
    ChangeLogEntry, Macro, MacroGrams, Preset, Slot, SlotBounds, SlotRole, SlotTags, Warning,
    WarningCode,
};
use serde_json::json;
use tracing::debug;

/// Bisection rounds for the protein water level
const WATER_LEVEL_ROUNDS: usize = 64;

/// First-pass allocation of all three macros
#[must_use]
pub fn allocate(
    slots: &[Slot],
    bounds: &[SlotBounds],
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) -> Vec<Slot> {
    let mut allocated = slots.to_vec();
    if allocated.is_empty() {
        return allocated;
    }
    let protein = allocate_protein(slots, bounds, ctx, journal);
    let carbs = allocate_carbs(slots, bounds, ctx);
    let fat = allocate_fat(slots, ctx);
    for (i, slot) in allocated.iter_mut().enumerate() {
        slot.macros = MacroGrams::new(protein[i], carbs[i], fat[i]);
    }

    compensate_main_floor(&mut allocated, ctx, journal);
    if ctx.preset == Preset::LeanPm {
        shift_lean_pm_fat(&mut allocated, bounds, ctx, journal);
    }
    shift_evening_fat(&mut allocated, ctx, journal);

    for (slot, bound) in allocated.iter_mut().zip(bounds) {
        for nutrient in Macro::ALL {
            let grams = bound.get(nutrient).clamp(slot.macros.get(nutrient));
            slot.macros.set(nutrient, grams);
        }
    }
    debug!(
        protein = allocated.iter().map(|s| s.macros.protein).sum::<u32>(),
        carbs = allocated.iter().map(|s| s.macros.carbs).sum::<u32>(),
        fat = allocated.iter().map(|s| s.macros.fat).sum::<u32>(),
        "first-pass allocation"
    );
    allocated
}

fn protein_floor(slot: &Slot, ctx: &StageContext<'_>) -> f64 {
    let Some(body_weight) = ctx
        .inputs
        .body_weight_kg
        .filter(|w| w.is_finite() && *w > 0.0)
    else {
        return 0.0;
    };
    let allocation = &ctx.config.allocation;
    let mut floor: f64 = 0.0;
    if slot.tags.intersects(SlotTags::PRE | SlotTags::POST) {
        floor = floor.max(allocation.peri_workout_protein_g_per_kg * body_weight);
    }
    if slot.has(SlotTags::SLEEP) {
        floor = floor.max(allocation.sleep_protein_g_per_kg * body_weight);
    }
    floor
}

/// Lower ranks are corrected first; the sleep floor survives longest
fn correction_rank(slot: &Slot) -> u8 {
    if slot.has(SlotTags::SLEEP) {
        3
    } else if slot.has(SlotTags::POST) {
        2
    } else if slot.has(SlotTags::PRE) {
        1
    } else {
        0
    }
}

fn water_level(lo: &[f64], hi: &[f64], total: f64) -> f64 {
    let fill = |level: f64| -> f64 {
        lo.iter()
            .zip(hi)
            .map(|(l, h)| level.max(*l).min(*h))
            .sum()
    };
    let mut low = 0.0;
    let mut high = total + lo.iter().copied().fold(0.0, f64::max);
    for _ in 0..WATER_LEVEL_ROUNDS {
        let mid = (low + high) / 2.0;
        if fill(mid) < total {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

fn allocate_protein(
    slots: &[Slot],
    bounds: &[SlotBounds],
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) -> Vec<u32> {
    let total = f64::from(ctx.targets.protein);
    let hi: Vec<f64> = bounds
        .iter()
        .map(|b| b.protein.max.map_or(f64::INFINITY, f64::from))
        .collect();
    let mut lo: Vec<f64> = slots
        .iter()
        .zip(bounds)
        .zip(&hi)
        .map(|((slot, bound), h)| protein_floor(slot, ctx).max(f64::from(bound.protein.min)).min(*h))
        .collect();

    let lo_sum: f64 = lo.iter().sum();
    if lo_sum > total && lo_sum > 0.0 {
        let scale = total / lo_sum;
        for floor in &mut lo {
            *floor *= scale;
        }
        journal.warn(
            Warning::new(
                WarningCode::ProteinFloorShorted,
                format!(
                    "protein floors need {lo_sum:.0} g but the target is {total:.0} g; floors scaled by {scale:.2}"
                ),
            )
            .with_fix("raise the protein target or lower the per-meal floors"),
        );
    }

    let level = water_level(&lo, &hi, total);
    let ideal: Vec<f64> = lo
        .iter()
        .zip(&hi)
        .map(|(l, h)| level.max(*l).min(*h))
        .collect();
    let ranks: Vec<u8> = slots.iter().map(correction_rank).collect();
    round_to_grid(&ideal, bounds, &ranks, ctx.targets.protein, ctx)
}

/// Round ideal shares onto the grid and correct the residual towards `target`
fn round_to_grid(
    ideal: &[f64],
    bounds: &[SlotBounds],
    ranks: &[u8],
    target: u32,
    ctx: &StageContext<'_>,
) -> Vec<u32> {
    let step = ctx.step();
    let step_f = f64::from(step);
    let mut grams: Vec<u32> = ideal
        .iter()
        .zip(bounds)
        .map(|(x, b)| b.protein.clamp(((x / step_f).round() * step_f) as u32))
        .collect();
    let mut remaining = i64::from(target) - grams.iter().map(|g| i64::from(*g)).sum::<i64>();
    let step_i = i64::from(step);

    for _ in 0..ctx.config.limits.distribution {
        let pick = if remaining >= step_i {
            (0..grams.len())
                .filter(|&i| bounds[i].protein.headroom(grams[i]) >= step)
                .max_by(|&a, &b| {
                    let da = ideal[a] - f64::from(grams[a]);
                    let db = ideal[b] - f64::from(grams[b]);
                    da.total_cmp(&db).then_with(|| b.cmp(&a))
                })
        } else if remaining <= -step_i {
            (0..grams.len())
                .filter(|&i| bounds[i].protein.slack(grams[i]) >= step)
                .min_by(|&a, &b| {
                    let ea = f64::from(grams[a]) - ideal[a];
                    let eb = f64::from(grams[b]) - ideal[b];
                    ranks[a]
                        .cmp(&ranks[b])
                        .then_with(|| eb.total_cmp(&ea))
                        .then_with(|| a.cmp(&b))
                })
        } else {
            break;
        };
        let Some(i) = pick else {
            break;
        };
        if remaining > 0 {
            grams[i] += step;
            remaining -= step_i;
        } else {
            grams[i] -= step;
            remaining += step_i;
        }
    }

    let residue = u32::try_from(remaining.unsigned_abs()).unwrap_or(0);
    if remaining > 0 {
        let target_slot = (0..grams.len())
            .filter(|&i| bounds[i].protein.headroom(grams[i]) >= residue)
            .max_by(|&a, &b| ideal[a].total_cmp(&ideal[b]).then_with(|| b.cmp(&a)));
        if let Some(i) = target_slot {
            grams[i] += residue;
        }
    } else if remaining < 0 {
        let target_slot = (0..grams.len())
            .filter(|&i| bounds[i].protein.slack(grams[i]) >= residue)
            .min_by(|&a, &b| ranks[a].cmp(&ranks[b]).then_with(|| grams[b].cmp(&grams[a])));
        if let Some(i) = target_slot {
            grams[i] -= residue;
        }
    }
    grams
}

fn allocate_carbs(slots: &[Slot], bounds: &[SlotBounds], ctx: &StageContext<'_>) -> Vec<u32> {
    let weights = carb_weights(ctx.preset, slots, ctx.base, &ctx.config.presets);
    split_on_grid(ctx.targets.carbs, &weights, ctx.step(), ctx.seed(1))
        .into_iter()
        .zip(bounds)
        .map(|(grams, bound)| bound.carbs.clamp(grams))
        .collect()
}

fn allocate_fat(slots: &[Slot], ctx: &StageContext<'_>) -> Vec<u32> {
    let step = ctx.step();
    let mut fat = vec![0; slots.len()];
    let eligible: Vec<usize> = (0..slots.len()).filter(|&i| !slots[i].explicit_zero).collect();
    if eligible.is_empty() {
        return fat;
    }
    let uniform = ctx.targets.fat / u32::try_from(eligible.len()).unwrap_or(u32::MAX);
    let peri_cap = peri_workout_fat_cap(ctx);

    let (peri, mut others): (Vec<usize>, Vec<usize>) = eligible
        .into_iter()
        .partition(|&i| slots[i].tags.intersects(SlotTags::PRE | SlotTags::POST));
    for &i in &peri {
        fat[i] = floor_to_step(uniform.min(peri_cap), step);
    }
    if others.is_empty() {
        others = peri;
    }
    let assigned: u32 = fat.iter().sum();
    let remainder = ctx.targets.fat.saturating_sub(assigned);
    let parts = split_on_grid(remainder, &vec![1.0; others.len()], step, ctx.seed(2));
    for (&i, grams) in others.iter().zip(parts) {
        fat[i] += grams;
    }
    fat
}

/// Shrink carbs and fat of main slots whose protein floor pushed them above the even share
fn compensate_main_floor(slots: &mut [Slot], ctx: &StageContext<'_>, journal: &mut Journal) {
    let Some(floor) = ctx.inputs.main_protein_floor_g else {
        return;
    };
    let eligible = slots.iter().filter(|s| !s.explicit_zero).count();
    if eligible == 0 {
        return;
    }
    let step = ctx.step();
    let even = ctx.targets.protein / u32::try_from(eligible).unwrap_or(u32::MAX);
    for slot in slots
        .iter_mut()
        .filter(|s| s.has(SlotTags::MAIN) && !s.explicit_zero)
    {
        let extra = slot.macros.protein.min(floor).saturating_sub(even);
        let carb_kcal = slot.macros.carbs * KCAL_PER_GRAM_CARBS;
        let fat_kcal = slot.macros.fat * KCAL_PER_GRAM_FAT;
        let other_kcal = carb_kcal + fat_kcal;
        if extra == 0 || other_kcal == 0 {
            continue;
        }
        let extra_kcal = f64::from(extra * KCAL_PER_GRAM_PROTEIN);
        let carb_cut = extra_kcal * f64::from(carb_kcal) / f64::from(other_kcal)
            / f64::from(KCAL_PER_GRAM_CARBS);
        let fat_cut = extra_kcal * f64::from(fat_kcal) / f64::from(other_kcal)
            / f64::from(KCAL_PER_GRAM_FAT);
        let carb_cut = floor_to_step(carb_cut.round() as u32, step).min(slot.macros.carbs);
        let fat_cut = floor_to_step(fat_cut.round() as u32, step).min(slot.macros.fat);
        if carb_cut == 0 && fat_cut == 0 {
            continue;
        }
        let before = slot.macros;
        slot.macros.carbs -= carb_cut;
        slot.macros.fat -= fat_cut;
        journal.record(
            ChangeLogEntry::new(
                "allocator.main_floor_compensation",
                json!(before),
                json!(slot.macros),
                format!("protein floor added {extra} g above the even share"),
            )
            .for_slot(slot.id.clone()),
        );
    }
}

fn is_free_main(slot: &Slot) -> bool {
    slot.role == SlotRole::Main && !slot.is_anchor() && !slot.explicit_zero
}

/// Cap fat on the last free main and the sleep slot, spreading the excess over the other free mains
fn shift_lean_pm_fat(
    slots: &mut [Slot],
    bounds: &[SlotBounds],
    ctx: &StageContext<'_>,
    journal: &mut Journal,
) {
    let cap = ctx.config.allocation.lean_pm_fat_cap_g;
    let capped = lean_pm_capped(slots);
    let receivers: Vec<usize> = (0..slots.len())
        .filter(|i| !capped.contains(i))
        .filter(|&i| is_free_main(&slots[i]) && bounds[i].fat.headroom(slots[i].macros.fat) > 0)
        .collect();
    if receivers.is_empty() {
        return;
    }
    let mut excess = 0;
    for &i in &capped {
        let fat = slots[i].macros.fat;
        if fat > cap {
            excess += fat - cap;
            slots[i].macros.fat = cap;
        }
    }
    if excess == 0 {
        return;
    }
    let parts = split_on_grid(excess, &vec![1.0; receivers.len()], ctx.step(), ctx.seed(3));
    for (&i, grams) in receivers.iter().zip(parts) {
        slots[i].macros.fat += grams;
    }
    journal.record(ChangeLogEntry::new(
        "allocator.lean_pm_fat",
        json!({ "capped": capped.iter().map(|&i| slots[i].id.clone()).collect::<Vec<_>>() }),
        json!({ "moved_g": excess }),
        format!("leanPM caps late fat at {cap} g"),
    ));
}

/// Move fat off slots at or after the evening limit, in proportion to earlier slots' own fat
fn shift_evening_fat(slots: &mut [Slot], ctx: &StageContext<'_>, journal: &mut Journal) {
    let Some(limit) = ctx.inputs.evening_fat_limit else {
        return;
    };
    let from = ctx.base.place(limit.from);
    let mut excess = 0;
    for slot in slots.iter_mut().filter(|s| s.time >= from) {
        if slot.macros.fat > limit.max_g {
            excess += slot.macros.fat - limit.max_g;
            slot.macros.fat = limit.max_g;
        }
    }
    if excess == 0 {
        return;
    }
    let receivers: Vec<usize> = (0..slots.len())
        .filter(|&i| slots[i].time < from && !slots[i].explicit_zero)
        .collect();
    let clock = ctx.base.label(from);
    if receivers.is_empty() {
        journal.warn(
            Warning::new(
                WarningCode::EveningFatLimitApplied,
                format!("{excess} g fat removed after {clock} with no earlier meal to absorb it"),
            )
            .with_fix("move the evening fat limit later"),
        );
        return;
    }
    let weights: Vec<f64> = receivers
        .iter()
        .map(|&i| f64::from(slots[i].macros.fat))
        .collect();
    let parts = split_on_grid(excess, &weights, ctx.step(), ctx.seed(4));
    for (&i, grams) in receivers.iter().zip(parts) {
        slots[i].macros.fat += grams;
    }
    journal.warn(Warning::new(
        WarningCode::EveningFatLimitApplied,
        format!(
            "{excess} g fat moved before {clock} to keep later meals at or below {} g",
            limit.max_g
        ),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_level_funds_floors_from_free_slots() {
        let lo = [0.0, 0.0, 40.0];
        let hi = [f64::INFINITY; 3];
        let level = water_level(&lo, &hi, 100.0);
        assert!((level - 30.0).abs() < 1e-6);
    }

    #[test]
    fn water_level_respects_caps() {
        let lo = [0.0, 0.0];
        let hi = [10.0, f64::INFINITY];
        let level = water_level(&lo, &hi, 100.0);
        assert!((level - 90.0).abs() < 1e-6);
    }
}
