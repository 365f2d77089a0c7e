// ABOUTME: End-to-end planner scenarios across presets, rest days, and the single-meal fallback
// ABOUTME: Each scenario checks the plan invariants plus the behaviour that distinguishes it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    assert_on_grid, assert_plan_invariants, at, hm, init_test_logging, reference_targets, run,
    scenario_a, slot, warning_codes,
};
use macroplan::{
    MacroType, MealPlan, NapBlock, PlanInputs, PlanStage, Preset, Severity, SlotAttributes,
    WarningCode,
};

fn scenario_d() -> PlanInputs {
    scenario_a().with_preset(Preset::Even)
}

fn carbs(plan: &MealPlan) -> Vec<u32> {
    plan.slots.iter().map(|s| s.macros.carbs).collect()
}

// === Presets ===

#[test]
fn test_even_preset_spreads_carbs_uniformly() {
    init_test_logging();
    let inputs = scenario_d();
    let plan = run(&inputs);

    assert_eq!(plan.preset_used, Preset::Even);
    let mut sorted = carbs(&plan);
    sorted.sort_unstable();
    assert_eq!(sorted, vec![65, 65, 70, 70, 70]);
    assert_on_grid(&plan, 5);
    assert_plan_invariants(&plan, &inputs);
}

#[test]
fn test_am_and_pm_presets_lean_opposite_ways() {
    let am = run(&scenario_a().with_preset(Preset::AmCarbs));
    let pm = run(&scenario_a().with_preset(Preset::PmCarbs));

    assert!(slot(&am, "wake").macros.carbs > slot(&pm, "wake").macros.carbs);
    assert!(slot(&am, "sleep").macros.carbs < slot(&pm, "sleep").macros.carbs);
    assert_eq!(am.totals().carbs, 340);
    assert_eq!(pm.totals().carbs, 340);
}

#[test]
fn test_backload_pushes_carbs_late() {
    let inputs = scenario_a().with_preset(Preset::Backload);
    let plan = run(&inputs);

    let post = slot(&plan, "post-0").macros.carbs;
    assert!(plan.slots.iter().all(|s| s.macros.carbs <= post));
    assert!(slot(&plan, "sleep").macros.carbs > slot(&plan, "wake").macros.carbs);
    assert_plan_invariants(&plan, &inputs);
}

#[test]
fn test_high_carb_slot_outweighs_its_peers() {
    let mut inputs = scenario_d();
    inputs.slot_attributes.insert(
        "main-1".to_owned(),
        SlotAttributes {
            macro_type: MacroType::HighCarb,
            ..SlotAttributes::default()
        },
    );
    let plan = run(&inputs);

    let main = slot(&plan, "main-1").macros.carbs;
    assert!(plan
        .slots
        .iter()
        .filter(|s| s.id != "main-1")
        .all(|s| s.macros.carbs < main));
    assert_plan_invariants(&plan, &inputs);
}

// === Rest Days ===

#[test]
fn test_rest_day_substitutes_training_presets() {
    let mut inputs = scenario_a();
    inputs.training_day = false;
    let plan = run(&inputs);

    assert_eq!(plan.preset_used, Preset::RestEven);
    let warning = plan
        .warnings
        .iter()
        .find(|w| w.code == WarningCode::PresetRestSubstitute)
        .expect("substitution warning");
    assert_eq!(warning.severity, Severity::Info);
    assert!(plan
        .change_log
        .iter()
        .any(|e| e.rule == "presets.rest_substitute"));
    assert_plan_invariants(&plan, &inputs);
}

#[test]
fn test_rest_day_keeps_am_lean() {
    let mut inputs = scenario_a().with_preset(Preset::AmCarbs);
    inputs.training_day = false;
    let plan = run(&inputs);
    assert_eq!(plan.preset_used, Preset::RestAm);
}

#[test]
fn test_even_preset_is_not_substituted() {
    let mut inputs = scenario_d();
    inputs.training_day = false;
    let plan = run(&inputs);

    assert_eq!(plan.preset_used, Preset::Even);
    assert!(!plan.has_warning(WarningCode::PresetRestSubstitute));
}

// === Fallback ===

#[test]
fn test_empty_schedule_falls_back_to_one_meal() {
    // the nap covers the whole waking hour, so every anchor is dropped
    let mut inputs = PlanInputs::new(hm(6, 0), hm(7, 0), reference_targets());
    inputs.nap_blocks.push(NapBlock {
        start: hm(6, 0),
        end: hm(7, 0),
    });
    let plan = run(&inputs);

    assert!(plan.has_warning(WarningCode::PlanEmpty));
    assert_eq!(plan.slots.len(), 1);
    let only = &plan.slots[0];
    assert_eq!(only.id, "fallback");
    assert_eq!(only.time, at(6, 30));
    assert_eq!(plan.totals(), plan.targets.grams());
    assert_eq!(plan.total_kcal(), 2800);
    let codes = warning_codes(&plan);
    assert!(codes.contains(&WarningCode::AnchorDropped));
}

// === Wire Format ===

#[test]
fn test_plan_stage_wire_names() {
    assert_eq!(
        serde_json::to_string(&PlanStage::Normalize).unwrap(),
        "\"NORMALIZE\""
    );
    assert_eq!(
        serde_json::from_str::<PlanStage>("\"FALLBACK\"").unwrap(),
        PlanStage::Fallback
    );
}

#[test]
fn test_inputs_deserialize_with_defaults() {
    let inputs: PlanInputs = serde_json::from_value(serde_json::json!({
        "wake": "06:30:00",
        "sleep": "23:00:00",
        "targets": { "kcal": "2 800", "protein": 180, "carbs": "340", "fat": "80" },
        "meals_target": 5,
        "min_gap_min": 120,
        "target_gap_min": 180,
        "preset": "leanPM"
    }))
    .unwrap();

    assert!(inputs.training_day);
    assert_eq!(inputs.preset, Preset::LeanPm);
    let plan = run(&inputs);
    assert_eq!(plan.total_kcal(), 2800);
    assert_plan_invariants(&plan, &inputs);
}
