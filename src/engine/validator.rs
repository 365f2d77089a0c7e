// ABOUTME: Invariant validator raising defect-class errors on malformed plans
// ABOUTME: Checks slot ids, ordering, window membership, finite kcal, exact macro sums and kcal tolerance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::macro_sum;
use macroplan_core::models::{Macro, Slot, Targets, TimeBase};
use macroplan_core::{InvariantViolation, PlanError};
use std::collections::HashSet;

/// Which checks are relaxed because an earlier stage already reported the shortfall
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Macros carrying an `*_UNACHIEVABLE_WITH_LIMITS` or `MACRO_DRIFTED_FOR_KCAL` warning
    pub exempt_macros: Vec<Macro>,
    /// Skip the kcal check (kcal unachievable or incoherent targets)
    pub exempt_kcal: bool,
    /// Accepted |Σkcal − target|
    pub kcal_tolerance: u32,
}

fn checked_kcal(slot: &Slot) -> Option<u32> {
    Macro::ALL.iter().try_fold(0_u32, |acc, &m| {
        slot.macros
            .get(m)
            .checked_mul(m.kcal_per_gram())
            .and_then(|kcal| acc.checked_add(kcal))
    })
}

fn check_slot_list(slots: &[Slot], base: TimeBase) -> Result<(), InvariantViolation> {
    if slots.is_empty() {
        return Err(InvariantViolation::NoSlots);
    }
    let mut seen = HashSet::with_capacity(slots.len());
    let mut previous: Option<i32> = None;
    for (index, slot) in slots.iter().enumerate() {
        if slot.id.is_empty() {
            return Err(InvariantViolation::MissingSlotId { index });
        }
        if !seen.insert(slot.id.as_str()) {
            return Err(InvariantViolation::DuplicateSlotId {
                id: slot.id.clone(),
            });
        }
        if previous.is_some_and(|p| slot.time < p) {
            return Err(InvariantViolation::OutOfOrder {
                id: slot.id.clone(),
            });
        }
        if !base.contains(slot.time) {
            return Err(InvariantViolation::SlotOutsideWindow {
                id: slot.id.clone(),
                time: slot.time,
                wake: base.wake,
                sleep: base.sleep,
            });
        }
        if checked_kcal(slot).is_none() {
            return Err(InvariantViolation::NonFiniteKcal {
                id: slot.id.clone(),
            });
        }
        previous = Some(slot.time);
    }
    Ok(())
}

fn check_totals(
    slots: &[Slot],
    targets: &Targets,
    policy: &ValidationPolicy,
) -> Result<(), InvariantViolation> {
    for nutrient in Macro::ALL {
        if policy.exempt_macros.contains(&nutrient) {
            continue;
        }
        let actual = macro_sum(slots, nutrient);
        let expected = targets.get(nutrient);
        if actual != expected {
            return Err(InvariantViolation::MacroSumMismatch {
                nutrient,
                expected,
                actual,
            });
        }
    }
    if !policy.exempt_kcal {
        let actual: u32 = slots.iter().filter_map(checked_kcal).sum();
        if actual.abs_diff(targets.kcal) > policy.kcal_tolerance {
            return Err(InvariantViolation::KcalMismatch {
                expected: targets.kcal,
                actual,
                tolerance: policy.kcal_tolerance,
            });
        }
    }
    Ok(())
}

/// Validate a finished plan
///
/// # Errors
///
/// Returns `PlanError::Invariant` naming the first broken invariant. These
/// are defects in the engine, never user-correctable input problems.
pub fn validate(
    slots: &[Slot],
    base: TimeBase,
    targets: &Targets,
    policy: &ValidationPolicy,
) -> Result<(), PlanError> {
    check_slot_list(slots, base)?;
    check_totals(slots, targets, policy)?;
    Ok(())
}
