// ABOUTME: Macro bounds builder producing a [min, max] range with provenance per slot and macro
// ABOUTME: Layers user limits, nightly/evening fat caps, and preset policy; user sides win conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Macro bounds builder
//!
//! Rules are layered onto an open `[0, ∞)` bound by intersection. The
//! intersection keeps the strongest source; an empty intersection keeps the
//! stronger side (or collapses onto the cap when both sides share a source)
//! and journals `BOUNDS_CONFLICT`.

use super::{Journal, StageContext};
use macroplan_core::models::{
    BoundSource, Macro, MacroBound, Preset, Slot, SlotBounds, SlotRole, SlotTags, Warning,
    WarningCode,
};
use std::cmp::Ordering;

/// Round `grams` down to the allocation grid
pub(crate) const fn floor_to_step(grams: u32, step: u32) -> u32 {
    if step == 0 {
        return grams;
    }
    grams / step * step
}

/// Pre/post-workout fat cap: the smaller of the absolute cap and the share of daily fat
#[must_use]
pub fn peri_workout_fat_cap(ctx: &StageContext<'_>) -> u32 {
    let allocation = &ctx.config.allocation;
    let share = (f64::from(ctx.targets.fat) * allocation.peri_workout_fat_cap_share).round() as u32;
    floor_to_step(share.min(allocation.peri_workout_fat_cap_g), ctx.step())
}

/// Index of the last freely placed main slot
#[must_use]
pub fn last_free_main(slots: &[Slot]) -> Option<usize> {
    slots
        .iter()
        .rposition(|s| s.role == SlotRole::Main && !s.is_anchor() && !s.explicit_zero)
}

/// Slots whose fat is capped under the `leanPM` preset
#[must_use]
pub fn lean_pm_capped(slots: &[Slot]) -> Vec<usize> {
    let mut capped: Vec<usize> = last_free_main(slots).into_iter().collect();
    capped.extend(
        slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has(SlotTags::SLEEP))
            .map(|(i, _)| i),
    );
    capped.sort_unstable();
    capped.dedup();
    capped
}

fn intersect(current: MacroBound, incoming: MacroBound) -> Result<MacroBound, MacroBound> {
    let min = current.min.max(incoming.min);
    let max = match (current.max, incoming.max) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    let source = current.source.max(incoming.source);
    if max.is_some_and(|max| max < min) {
        let resolved = match current.source.cmp(&incoming.source) {
            Ordering::Greater => current,
            Ordering::Less => incoming,
            Ordering::Equal => {
                let cap = max.unwrap_or(min);
                MacroBound::new(cap, Some(cap), source)
            }
        };
        return Err(resolved);
    }
    Ok(MacroBound::new(min, max, source))
}

fn layer(
    bounds: &mut SlotBounds,
    slot: &Slot,
    nutrient: Macro,
    incoming: MacroBound,
    journal: &mut Journal,
) {
    let current = bounds.get(nutrient);
    match intersect(current, incoming) {
        Ok(merged) => *bounds.get_mut(nutrient) = merged,
        Err(resolved) => {
            journal.warn(Warning::new(
                WarningCode::BoundsConflict,
                format!(
                    "{}: {nutrient} bounds [{}, {}] and [{}, {}] do not overlap; kept [{}, {}]",
                    slot.id,
                    current.min,
                    fmt_max(current.max),
                    incoming.min,
                    fmt_max(incoming.max),
                    resolved.min,
                    fmt_max(resolved.max),
                ),
            ));
            *bounds.get_mut(nutrient) = resolved;
        }
    }
}

fn fmt_max(max: Option<u32>) -> String {
    max.map_or_else(|| "∞".to_owned(), |m| m.to_string())
}

/// Build per-slot bounds
pub fn build_bounds(slots: &[Slot], ctx: &StageContext<'_>, journal: &mut Journal) -> Vec<SlotBounds> {
    let inputs = ctx.inputs;
    let peri_fat_cap = peri_workout_fat_cap(ctx);
    let lean_capped = if ctx.preset == Preset::LeanPm {
        lean_pm_capped(slots)
    } else {
        Vec::new()
    };
    let evening = inputs
        .evening_fat_limit
        .map(|limit| (ctx.base.place(limit.from), limit.max_g));

    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            if slot.explicit_zero {
                return SlotBounds::locked_zero();
            }
            let mut bounds = SlotBounds::default();

            if let Some(limits) = slot.limits {
                for nutrient in Macro::ALL {
                    let limit = limits.get(nutrient);
                    if !limit.is_empty() {
                        let bound =
                            MacroBound::new(limit.min.unwrap_or(0), limit.max, BoundSource::User);
                        layer(&mut bounds, slot, nutrient, bound, journal);
                    }
                }
            }
            if let Some(cap) = inputs.nightly_fat_cap_g.filter(|_| slot.has(SlotTags::SLEEP)) {
                let bound = MacroBound::new(0, Some(cap), BoundSource::User);
                layer(&mut bounds, slot, Macro::Fat, bound, journal);
            }
            if let Some((_, max_g)) = evening.filter(|(from, _)| slot.time >= *from) {
                let bound = MacroBound::new(0, Some(max_g), BoundSource::User);
                layer(&mut bounds, slot, Macro::Fat, bound, journal);
            }

            if let Some(min) = inputs
                .min_pre_workout_carbs_g
                .filter(|_| slot.has(SlotTags::PRE))
            {
                let bound = MacroBound::new(min, None, BoundSource::Preset);
                layer(&mut bounds, slot, Macro::Carbs, bound, journal);
            }
            if let Some(floor) = inputs.main_protein_floor_g.filter(|_| slot.has(SlotTags::MAIN)) {
                let bound = MacroBound::new(floor, None, BoundSource::Preset);
                layer(&mut bounds, slot, Macro::Protein, bound, journal);
            }
            if slot.tags.intersects(SlotTags::PRE | SlotTags::POST) {
                let bound = MacroBound::new(0, Some(peri_fat_cap), BoundSource::Preset);
                layer(&mut bounds, slot, Macro::Fat, bound, journal);
            }
            if lean_capped.contains(&index) {
                let cap = ctx.config.allocation.lean_pm_fat_cap_g;
                let bound = MacroBound::new(0, Some(cap), BoundSource::Preset);
                layer(&mut bounds, slot, Macro::Fat, bound, journal);
            }
            bounds
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_keeps_strongest_source() {
        let user = MacroBound::new(0, Some(20), BoundSource::User);
        let preset = MacroBound::new(5, None, BoundSource::Preset);
        let merged = intersect(user, preset).unwrap_or_else(|b| b);
        assert_eq!(merged, MacroBound::new(5, Some(20), BoundSource::User));
    }

    #[test]
    fn conflict_resolves_for_the_user_side() {
        let user = MacroBound::new(0, Some(10), BoundSource::User);
        let preset = MacroBound::new(30, None, BoundSource::Preset);
        assert_eq!(intersect(user, preset), Err(user));
        assert_eq!(intersect(preset, user), Err(user));

        let a = MacroBound::new(30, None, BoundSource::User);
        let b = MacroBound::new(0, Some(10), BoundSource::User);
        assert_eq!(
            intersect(a, b),
            Err(MacroBound::new(10, Some(10), BoundSource::User))
        );
    }

    #[test]
    fn grid_floor() {
        assert_eq!(floor_to_step(12, 5), 10);
        assert_eq!(floor_to_step(4, 5), 0);
        assert_eq!(floor_to_step(7, 0), 7);
    }
}
