// ABOUTME: Shared test utilities for macroplan integration tests
// ABOUTME: Logging bootstrap, clock helpers, reference scenarios, and plan invariant assertions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls
)]

//! Shared test utilities for `macroplan`
//!
//! Scenario A is the reference training day used across the suite: wake
//! 06:30, sleep 23:00, one strength block 17:30-19:00, 2800 kcal with
//! 180/340/80 g protein/carbs/fat and a five-meal goal.

use chrono::NaiveTime;
use macroplan::{
    plan, GymBlock, Macro, MacroGrams, MacroLimits, MealPlan, PlanConfig, PlanInputs, Preset,
    RawTargets, Slot, SlotAttributes, SlotTags, TimeBase, TrainingKind, UserLimit, WarningCode,
};
use std::collections::HashSet;
use std::env;
use std::sync::Once;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
///
/// Set `TEST_LOG=DEBUG` to watch stage transitions.
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Clock helpers
// ============================================================================

/// Wall-clock time from hours and minutes
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Minute of day
pub const fn at(hour: i32, minute: i32) -> i32 {
    hour * 60 + minute
}

pub fn strength_block(start: NaiveTime, end: NaiveTime) -> GymBlock {
    GymBlock {
        start,
        end,
        kind: TrainingKind::Strength,
        priority: 0,
    }
}

// ============================================================================
// Reference scenarios
// ============================================================================

pub fn reference_targets() -> RawTargets {
    RawTargets::new(2800, 180, 340, 80)
}

/// Training day with an evening strength block and five meals
pub fn scenario_a() -> PlanInputs {
    PlanInputs::new(hm(6, 30), hm(23, 0), reference_targets())
        .with_gym_block(strength_block(hm(17, 30), hm(19, 0)))
        .with_meals_target(5)
}

/// Scenario A under the `leanPM` preset
pub fn scenario_b() -> PlanInputs {
    scenario_a().with_preset(Preset::LeanPm)
}

/// Seven meals in a fourteen-hour window with a two-hour minimum gap
pub fn scenario_c() -> PlanInputs {
    PlanInputs::new(hm(7, 0), hm(21, 0), reference_targets()).with_meals_target(7)
}

/// Attributes capping one macro of a slot
pub fn capped(nutrient: Macro, max: u32) -> SlotAttributes {
    let limit = UserLimit {
        min: None,
        max: Some(max),
    };
    let mut limits = MacroLimits::default();
    match nutrient {
        Macro::Protein => limits.protein = limit,
        Macro::Carbs => limits.carbs = limit,
        Macro::Fat => limits.fat = limit,
    }
    SlotAttributes {
        limits,
        ..SlotAttributes::default()
    }
}

// ============================================================================
// Running and inspecting plans
// ============================================================================

/// Plan with the default configuration, panicking on error
pub fn run(inputs: &PlanInputs) -> MealPlan {
    init_test_logging();
    plan(inputs, &PlanConfig::default()).unwrap()
}

pub fn slot<'a>(plan: &'a MealPlan, id: &str) -> &'a Slot {
    plan.slot(id)
        .unwrap_or_else(|| panic!("slot {id} missing from {:?}", ids(plan)))
}

pub fn ids(plan: &MealPlan) -> Vec<&str> {
    plan.slots.iter().map(|s| s.id.as_str()).collect()
}

pub fn times(plan: &MealPlan) -> Vec<i32> {
    plan.slots.iter().map(|s| s.time).collect()
}

pub fn warning_codes(plan: &MealPlan) -> Vec<WarningCode> {
    plan.warnings.iter().map(|w| w.code).collect()
}

/// Whether the reconciler moved `nutrient` off its gram target to meet kcal, and said so
pub fn drifted(plan: &MealPlan, nutrient: Macro) -> bool {
    let prefix = format!("{nutrient} ");
    let logged = plan
        .change_log
        .iter()
        .any(|e| e.rule == "reconciler.drift" && e.reason.starts_with(&prefix));
    let warned = plan
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::MacroDriftedForKcal && w.message.starts_with(&prefix));
    assert_eq!(logged, warned, "{nutrient} drift logged without a warning or vice versa");
    warned
}

/// Structural and exactness checks every successful plan must pass
pub fn assert_plan_invariants(plan: &MealPlan, inputs: &PlanInputs) {
    assert!(!plan.slots.is_empty(), "plan has no slots");

    let base = TimeBase::resolve(inputs.wake, inputs.sleep, inputs.day.as_ref()).unwrap();
    let mut seen = HashSet::new();
    for pair in plan.slots.windows(2) {
        assert!(
            pair[0].time <= pair[1].time,
            "slots out of order: {} then {}",
            pair[0].id,
            pair[1].id
        );
    }
    for slot in &plan.slots {
        assert!(!slot.id.is_empty());
        assert!(seen.insert(slot.id.clone()), "duplicate id {}", slot.id);
        assert!(
            base.contains(slot.time),
            "{} at {} outside {}..{}",
            slot.id,
            slot.time,
            base.wake,
            base.sleep
        );
    }

    let min_gap = i32::try_from(inputs.min_gap_min).unwrap();
    for pair in plan.slots.windows(2) {
        let gap = pair[1].time - pair[0].time;
        if gap >= min_gap || pair[0].has(SlotTags::MERGED) || pair[1].has(SlotTags::MERGED) {
            continue;
        }
        assert!(
            plan.has_warning(WarningCode::MinGapViolation),
            "{} and {} are {gap} min apart without a warning",
            pair[0].id,
            pair[1].id
        );
    }

    for slot in &plan.slots {
        assert!(
            slot.macros != MacroGrams::default() || slot.explicit_zero,
            "{} carries no macros",
            slot.id
        );
    }

    let totals = plan.totals();
    for nutrient in Macro::ALL {
        if plan.has_warning(WarningCode::unachievable(nutrient)) || drifted(plan, nutrient) {
            continue;
        }
        assert_eq!(
            totals.get(nutrient),
            plan.targets.get(nutrient),
            "{nutrient} sum differs from target"
        );
    }
    let kcal_exempt = plan.has_warning(WarningCode::KcalTargetUnachievableWithLimits)
        || plan.has_warning(WarningCode::TargetsKcalMismatch);
    if !kcal_exempt {
        assert!(
            plan.total_kcal().abs_diff(plan.targets.kcal) <= 1,
            "kcal {} vs target {}",
            plan.total_kcal(),
            plan.targets.kcal
        );
    }
}

/// Every macro value is a multiple of `step` except at most one residue slot per macro
pub fn assert_on_grid(plan: &MealPlan, step: u32) {
    for nutrient in Macro::ALL {
        let off_grid = plan
            .slots
            .iter()
            .filter(|s| s.macros.get(nutrient) % step != 0)
            .count();
        assert!(
            off_grid <= 1,
            "{off_grid} slots carry off-grid {nutrient}: {:?}",
            plan.slots.iter().map(|s| s.macros).collect::<Vec<_>>()
        );
    }
}
