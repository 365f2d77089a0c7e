// ABOUTME: Meal-plan compute engine: scheduling, bounds, allocation, fixing, reconciliation
// ABOUTME: Stages are pure functions over slot lists; the orchestrator composes them in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal-Plan Engine
//!
//! Data flows leaves-first:
//!
//! ```text
//! inputs -> normalizer -> scheduler -> bounds -> allocator -> fixer -> reconciler -> validator
//! ```
//!
//! Each stage takes the previous stage's slot list by reference and returns a
//! new one. Warnings and audit entries are appended to a per-invocation
//! [`Journal`] that the orchestrator turns into the final [`MealPlan`].
//!
//! [`MealPlan`]: macroplan_core::models::MealPlan

pub mod allocator;
pub mod bounds;
pub mod fixer;
pub mod normalizer;
pub mod orchestrator;
pub mod presets;
pub mod reconciler;
pub mod scheduler;
pub mod splitter;
pub mod validator;

use crate::config::PlanConfig;
use macroplan_core::models::{
    ChangeLogEntry, Macro, PlanInputs, Preset, Slot, Targets, TimeBase, Warning, WarningCode,
};
use tracing::{debug, warn};

/// Read-only inputs shared by the macro stages of one invocation
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Host inputs
    pub inputs: &'a PlanInputs,
    /// Tunables
    pub config: &'a PlanConfig,
    /// Normalized targets
    pub targets: Targets,
    /// Preset after rest-day substitution
    pub preset: Preset,
    /// Resolved wake/sleep window
    pub base: TimeBase,
}

impl StageContext<'_> {
    /// Allocation grid in grams, never zero
    #[must_use]
    pub fn step(&self) -> u32 {
        self.config.allocation.step_g.max(1)
    }

    /// Seed for one stage
    #[must_use]
    pub const fn seed(&self, salt: u64) -> u64 {
        stage_seed(self.inputs.seed, salt)
    }
}

/// Append-only record of warnings and automatic adjustments for one invocation
#[derive(Debug, Clone, Default)]
pub struct Journal {
    warnings: Vec<Warning>,
    change_log: Vec<ChangeLogEntry>,
}

impl Journal {
    /// Empty journal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable condition
    pub fn warn(&mut self, warning: Warning) {
        warn!(
            code = %warning.code,
            severity = ?warning.severity,
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    /// Record an automatic adjustment
    pub fn record(&mut self, entry: ChangeLogEntry) {
        debug!(rule = %entry.rule, slot = ?entry.slot_id, "{}", entry.reason);
        self.change_log.push(entry);
    }

    /// Warnings recorded so far
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Audit entries recorded so far
    #[must_use]
    pub fn change_log(&self) -> &[ChangeLogEntry] {
        &self.change_log
    }

    /// Whether a warning with `code` was recorded
    #[must_use]
    pub fn has(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Consume the journal
    #[must_use]
    pub fn into_parts(self) -> (Vec<Warning>, Vec<ChangeLogEntry>) {
        (self.warnings, self.change_log)
    }
}

/// Convert a configured minute count onto the signed minute axis
pub(crate) fn minutes(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Summed grams of one macro over a slot list
pub(crate) fn macro_sum(slots: &[Slot], nutrient: Macro) -> u32 {
    slots.iter().map(|s| s.macros.get(nutrient)).sum()
}

/// Summed kcal over a slot list
pub(crate) fn kcal_sum(slots: &[Slot]) -> u32 {
    slots.iter().map(Slot::kcal).sum()
}

/// Derive a per-stage seed so stages never share a tie-break order
pub(crate) const fn stage_seed(seed: u64, salt: u64) -> u64 {
    seed.wrapping_add(salt)
}
