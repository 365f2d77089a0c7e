// ABOUTME: Defect-class invariant violations raised by the plan validator
// ABOUTME: Each variant names the exact broken invariant so tests can match on it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::Macro;
use thiserror::Error;

/// A hard plan invariant that did not hold at return time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The slot list is empty after the fallback path
    #[error("plan has no slots")]
    NoSlots,

    /// A slot entry has no identifier
    #[error("slot at index {index} has an empty id")]
    MissingSlotId {
        /// Position in the slot list
        index: usize,
    },

    /// Two slots share an identifier
    #[error("duplicate slot id {id}")]
    DuplicateSlotId {
        /// The repeated identifier
        id: String,
    },

    /// Slot time outside the wake/sleep window
    #[error("slot {id} at minute {time} lies outside [{wake}, {sleep}]")]
    SlotOutsideWindow {
        /// Slot identifier
        id: String,
        /// Offending absolute minute
        time: i32,
        /// Window start
        wake: i32,
        /// Window end
        sleep: i32,
    },

    /// Slot list not sorted by time
    #[error("slot {id} is earlier than its predecessor")]
    OutOfOrder {
        /// Slot identifier
        id: String,
    },

    /// Derived kcal of a slot is not a finite number
    #[error("slot {id} has a non-finite kcal value")]
    NonFiniteKcal {
        /// Slot identifier
        id: String,
    },

    /// A macro total differs from its target
    #[error("{nutrient} sum {actual} g does not match target {expected} g")]
    MacroSumMismatch {
        /// Which macro
        nutrient: Macro,
        /// Target grams
        expected: u32,
        /// Summed grams
        actual: u32,
    },

    /// Kcal total outside the reconciler tolerance
    #[error("kcal sum {actual} differs from target {expected} by more than {tolerance}")]
    KcalMismatch {
        /// Target kcal
        expected: u32,
        /// Summed kcal
        actual: u32,
        /// Allowed absolute difference
        tolerance: u32,
    },
}
