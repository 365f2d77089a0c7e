// ABOUTME: Tests for the plan invariant validator on hand-built slot lists
// ABOUTME: Each defect class maps to one InvariantViolation variant; exemptions relax only what they name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use macroplan::engine::validator::{validate, ValidationPolicy};
use macroplan::{
    InvariantViolation, Macro, MacroGrams, PlanError, Slot, SlotRole, Targets, TimeBase,
};

const BASE: TimeBase = TimeBase::new(420, 1320);

const TARGETS: Targets = Targets {
    kcal: 2100,
    protein: 100,
    carbs: 200,
    fat: 100,
};

fn meal(id: &str, time: i32, protein: u32, carbs: u32, fat: u32) -> Slot {
    let mut slot = Slot::new(id, time, "Meal", SlotRole::Main);
    slot.macros = MacroGrams::new(protein, carbs, fat);
    slot
}

fn valid_slots() -> Vec<Slot> {
    vec![
        meal("a", 450, 40, 100, 40),
        meal("b", 720, 30, 50, 30),
        meal("c", 1200, 30, 50, 30),
    ]
}

fn policy() -> ValidationPolicy {
    ValidationPolicy {
        kcal_tolerance: 1,
        ..ValidationPolicy::default()
    }
}

fn violation(result: Result<(), PlanError>) -> InvariantViolation {
    match result {
        Err(PlanError::Invariant(violation)) => violation,
        other => panic!("expected an invariant violation, got {other:?}"),
    }
}

// === Structure ===

#[test]
fn test_valid_plan_passes() {
    validate(&valid_slots(), BASE, &TARGETS, &policy()).unwrap();
}

#[test]
fn test_empty_plan() {
    let found = violation(validate(&[], BASE, &TARGETS, &policy()));
    assert_eq!(found, InvariantViolation::NoSlots);
}

#[test]
fn test_missing_and_duplicate_ids() {
    let mut slots = valid_slots();
    slots[1].id.clear();
    assert_eq!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::MissingSlotId { index: 1 }
    );

    let mut slots = valid_slots();
    slots[2].id = "a".to_owned();
    assert_eq!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::DuplicateSlotId { id: "a".to_owned() }
    );
}

#[test]
fn test_order_and_window() {
    let mut slots = valid_slots();
    slots[1].time = 460;
    slots[2].time = 440;
    assert_eq!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::OutOfOrder { id: "c".to_owned() }
    );

    let mut slots = valid_slots();
    slots[2].time = 1330;
    assert!(matches!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::SlotOutsideWindow { time: 1330, .. }
    ));
}

#[test]
fn test_equal_times_are_ordered() {
    let mut slots = valid_slots();
    slots[1].time = 450;
    validate(&slots, BASE, &TARGETS, &policy()).unwrap();
}

#[test]
fn test_overflowing_kcal() {
    let mut slots = valid_slots();
    slots[0].macros.fat = u32::MAX;
    assert_eq!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::NonFiniteKcal { id: "a".to_owned() }
    );
}

// === Totals ===

#[test]
fn test_macro_sum_mismatch_and_exemption() {
    let mut slots = valid_slots();
    slots[0].macros.carbs = 101;
    slots[0].macros.protein = 39;
    assert_eq!(
        violation(validate(&slots, BASE, &TARGETS, &policy())),
        InvariantViolation::MacroSumMismatch {
            nutrient: Macro::Protein,
            expected: 100,
            actual: 99,
        }
    );

    let exempt = ValidationPolicy {
        exempt_macros: vec![Macro::Protein, Macro::Carbs],
        ..policy()
    };
    validate(&slots, BASE, &TARGETS, &exempt).unwrap();
}

#[test]
fn test_kcal_tolerance_and_exemption() {
    let targets = Targets {
        kcal: 2102,
        ..TARGETS
    };
    assert_eq!(
        violation(validate(&valid_slots(), BASE, &targets, &policy())),
        InvariantViolation::KcalMismatch {
            expected: 2102,
            actual: 2100,
            tolerance: 1,
        }
    );

    let within = Targets {
        kcal: 2101,
        ..TARGETS
    };
    validate(&valid_slots(), BASE, &within, &policy()).unwrap();

    let exempt = ValidationPolicy {
        exempt_kcal: true,
        ..policy()
    };
    validate(&valid_slots(), BASE, &targets, &exempt).unwrap();
}
