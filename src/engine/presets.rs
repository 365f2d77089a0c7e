// ABOUTME: Preset weight builder mapping a distribution preset and slot roles to carb weights
// ABOUTME: Applies rest-day substitution, merged-slot maxima, macro-type multipliers and an epsilon floor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Journal;
use crate::config::{PresetWeightsConfig, RoleWeights};
use macroplan_core::models::{
    ChangeLogEntry, MacroType, Preset, Slot, SlotRole, SlotTags, TimeBase, Warning, WarningCode,
};
use serde_json::json;

/// Preset actually applied after rest-day substitution
#[must_use]
pub const fn effective_preset(preset: Preset, training_day: bool) -> Preset {
    if training_day {
        return preset;
    }
    match preset {
        Preset::Standard | Preset::PmCarbs | Preset::Backload => Preset::RestEven,
        Preset::AmCarbs => Preset::RestAm,
        other => other,
    }
}

/// Resolve the preset for the day, journaling a substitution
pub fn resolve_preset(preset: Preset, training_day: bool, journal: &mut Journal) -> Preset {
    let used = effective_preset(preset, training_day);
    if used != preset {
        journal.warn(Warning::new(
            WarningCode::PresetRestSubstitute,
            format!(
                "rest day: preset {} replaced by {}",
                preset.name(),
                used.name()
            ),
        ));
        journal.record(ChangeLogEntry::new(
            "presets.rest_substitute",
            json!(preset.name()),
            json!(used.name()),
            "training-day flag is false",
        ));
    }
    used
}

fn role_weight(table: &RoleWeights, slot: &Slot, late_from: i32) -> f64 {
    let mut candidates = Vec::with_capacity(4);
    if slot.has(SlotTags::WAKE) {
        candidates.push(table.wake);
    }
    if slot.has(SlotTags::PRE) {
        candidates.push(table.pre);
    }
    if slot.has(SlotTags::POST) {
        candidates.push(table.post);
    }
    if slot.has(SlotTags::SLEEP) {
        candidates.push(table.sleep);
    }
    if slot.has(SlotTags::MAIN) {
        candidates.push(match slot.role {
            SlotRole::AfterTraining { .. } => table.after_training,
            _ if slot.time >= late_from => table.late_main,
            _ => table.early_main,
        });
    }
    candidates.into_iter().fold(0.0, f64::max)
}

const fn macro_type_multiplier(config: &PresetWeightsConfig, macro_type: MacroType) -> f64 {
    match macro_type {
        MacroType::Balanced => 1.0,
        MacroType::HighCarb => config.high_carb_multiplier,
        MacroType::LowCarb => config.low_carb_multiplier,
    }
}

/// Carbohydrate weight per slot for an already-resolved preset
///
/// A merged slot takes the largest weight among its tags. Explicit-zero
/// slots get weight zero; every other weight is floored at the configured
/// epsilon.
#[must_use]
pub fn carb_weights(
    preset: Preset,
    slots: &[Slot],
    base: TimeBase,
    config: &PresetWeightsConfig,
) -> Vec<f64> {
    let table = config.for_preset(preset);
    let late_from = base.wake + base.window_len() / 2;
    slots
        .iter()
        .map(|slot| {
            if slot.explicit_zero {
                return 0.0;
            }
            let weight = role_weight(&table, slot, late_from)
                * macro_type_multiplier(config, slot.macro_type);
            weight.max(config.epsilon)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(role: SlotRole, time: i32) -> Slot {
        Slot::new("s", time, "slot", role)
    }

    fn base() -> TimeBase {
        TimeBase::new(390, 1380)
    }

    #[test]
    fn rest_day_substitution() {
        assert_eq!(effective_preset(Preset::Standard, false), Preset::RestEven);
        assert_eq!(effective_preset(Preset::AmCarbs, false), Preset::RestAm);
        assert_eq!(effective_preset(Preset::LeanPm, false), Preset::LeanPm);
        assert_eq!(effective_preset(Preset::Backload, true), Preset::Backload);
    }

    #[test]
    fn standard_boosts_workout_anchors() {
        let slots = vec![
            slot(SlotRole::Wake, 420),
            slot(
                SlotRole::Pre {
                    block: 0,
                    latest: 1035,
                },
                1005,
            ),
            slot(SlotRole::Main, 855),
        ];
        let weights = carb_weights(
            Preset::Standard,
            &slots,
            base(),
            &PresetWeightsConfig::default(),
        );
        assert!((weights[0] - 1.0).abs() < f64::EPSILON);
        assert!((weights[1] - 1.5).abs() < f64::EPSILON);
        assert!((weights[2] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn merged_slot_takes_max_tag_weight() {
        let mut merged = slot(SlotRole::Sleep, 1300);
        merged.tags |= SlotTags::POST | SlotTags::MERGED;
        let weights = carb_weights(
            Preset::Standard,
            &[merged],
            base(),
            &PresetWeightsConfig::default(),
        );
        assert!((weights[0] - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_zero_and_macro_type() {
        let mut zero = slot(SlotRole::Main, 600);
        zero.explicit_zero = true;
        let mut high = slot(SlotRole::Main, 700);
        high.macro_type = MacroType::HighCarb;
        let weights = carb_weights(
            Preset::Even,
            &[zero, high],
            base(),
            &PresetWeightsConfig::default(),
        );
        assert!(weights[0].abs() < f64::EPSILON);
        assert!((weights[1] - 1.5).abs() < f64::EPSILON);
    }
}
