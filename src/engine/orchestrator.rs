// ABOUTME: Plan orchestrator driving the engine stages as an explicit state machine
// ABOUTME: Normalize, schedule, bound, allocate, fix, reconcile, validate; empty slot lists fall back to one meal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Orchestrator
//!
//! ```text
//! Normalize -> Schedule -> Bound -> Allocate -> Fix -> Reconcile -> Validate -> Done
//!                  \________\________\__________\________\
//!                           (empty slot list) -> Fallback -> Validate
//! ```
//!
//! Input errors surface from `Normalize` and `Schedule` before any macro
//! work. The orchestrator owns the per-call [`Journal`] and lends it to each
//! step; nothing is shared between calls. The validator exempts a macro from
//! the exact-sum check only when the fixer or the reconciler warned about it.

use super::allocator::allocate;
use super::bounds::build_bounds;
use super::fixer::fix;
use super::normalizer::{normalize, NormalizedTargets};
use super::presets::resolve_preset;
use super::reconciler::reconcile;
use super::scheduler::schedule;
use super::validator::{validate, ValidationPolicy};
use super::{Journal, StageContext};
use crate::config::PlanConfig;
use macroplan_core::constants::slot_ids;
use macroplan_core::models::{
    MealPlan, PlanInputs, Preset, Slot, SlotBounds, SlotRole, TimeBase, Warning, WarningCode,
};
use macroplan_core::PlanError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStage {
    /// Parse and cohere targets
    Normalize,
    /// Build the slot list
    Schedule,
    /// Derive per-slot bounds
    Bound,
    /// First-pass macro allocation
    Allocate,
    /// Restore exact macro sums
    Fix,
    /// Close the kcal gap
    Reconcile,
    /// Check invariants
    Validate,
    /// Plan complete
    Done,
    /// Rebuild a single-meal plan after the slot list emptied
    Fallback,
}

/// Upper bound on state transitions; the longest path has nine
const MAX_TRANSITIONS: usize = 16;

struct PlanRun<'a> {
    inputs: &'a PlanInputs,
    config: &'a PlanConfig,
    normalized: NormalizedTargets,
    base: TimeBase,
    preset: Preset,
    slots: Vec<Slot>,
    bounds: Vec<SlotBounds>,
    policy: ValidationPolicy,
}

impl PlanRun<'_> {
    fn context(&self) -> StageContext<'_> {
        StageContext {
            inputs: self.inputs,
            config: self.config,
            targets: self.normalized.targets,
            preset: self.preset,
            base: self.base,
        }
    }

    /// Next state after the current one produced `self.slots`
    fn after(&self, next: PlanStage) -> PlanStage {
        if self.slots.is_empty() {
            PlanStage::Fallback
        } else {
            next
        }
    }

    fn step(&mut self, stage: PlanStage, journal: &mut Journal) -> Result<PlanStage, PlanError> {
        let next = match stage {
            PlanStage::Normalize => PlanStage::Schedule,
            PlanStage::Done => PlanStage::Done,
            PlanStage::Schedule => {
                self.slots = schedule(self.inputs, self.base, self.config, journal)?;
                self.after(PlanStage::Bound)
            }
            PlanStage::Bound => {
                let ctx = self.context();
                self.bounds = build_bounds(&self.slots, &ctx, journal);
                PlanStage::Allocate
            }
            PlanStage::Allocate => {
                let ctx = self.context();
                self.slots = allocate(&self.slots, &self.bounds, &ctx, journal);
                self.after(PlanStage::Fix)
            }
            PlanStage::Fix => {
                let ctx = self.context();
                let outcome = fix(&self.slots, &self.bounds, &ctx, journal);
                self.slots = outcome.slots;
                self.bounds = outcome.bounds;
                self.policy.exempt_macros = outcome.unachievable;
                self.after(PlanStage::Reconcile)
            }
            PlanStage::Reconcile => {
                if self.normalized.kcal_coherent {
                    let ctx = self.context();
                    let outcome = reconcile(&self.slots, &self.bounds, &ctx, journal);
                    self.slots = outcome.slots;
                    self.policy.exempt_kcal = outcome.kcal_unachievable;
                    for nutrient in outcome.drifted {
                        if !self.policy.exempt_macros.contains(&nutrient) {
                            self.policy.exempt_macros.push(nutrient);
                        }
                    }
                } else {
                    self.policy.exempt_kcal = true;
                }
                self.after(PlanStage::Validate)
            }
            PlanStage::Fallback => {
                self.fallback(journal);
                PlanStage::Validate
            }
            PlanStage::Validate => {
                validate(
                    &self.slots,
                    self.base,
                    &self.normalized.targets,
                    &self.policy,
                )?;
                for slot in &mut self.slots {
                    slot.clock_shift_min = self.base.clock_shift(slot.time);
                }
                PlanStage::Done
            }
        };
        debug!(from = ?stage, to = ?next, slots = self.slots.len(), "plan stage");
        Ok(next)
    }

    /// Replace the plan with one meal at the window midpoint carrying the whole targets
    fn fallback(&mut self, journal: &mut Journal) {
        journal.warn(
            Warning::new(
                WarningCode::PlanEmpty,
                "no meal slot survived scheduling; returning a single-meal fallback plan",
            )
            .with_fix("widen the wake/sleep window or remove conflicting blocks"),
        );
        let midpoint = self.base.wake + self.base.window_len() / 2;
        let mut slot = Slot::new(slot_ids::FALLBACK, midpoint, "Meal", SlotRole::Main);
        slot.macros = self.normalized.targets.grams();
        self.slots = vec![slot];
        self.bounds = vec![SlotBounds::default()];
        self.policy.exempt_kcal = !self.normalized.kcal_coherent;
        self.policy.exempt_macros.clear();
    }
}

/// Compute a meal plan
///
/// # Errors
///
/// Returns `PlanError::MissingKcal`, `PlanError::NonPositiveKcal`,
/// `PlanError::EmptyMacroTargets` or `PlanError::InvalidInput` for bad
/// inputs, and `PlanError::Invariant` if the finished plan breaks an
/// invariant (an engine defect).
pub fn plan(inputs: &PlanInputs, config: &PlanConfig) -> Result<MealPlan, PlanError> {
    let span = info_span!("meal_plan", seed = inputs.seed, meals = inputs.meals_target);
    let _guard = span.enter();

    let mut journal = Journal::new();
    let normalized = normalize(&inputs.targets, &mut journal)?;
    let base = TimeBase::resolve(inputs.wake, inputs.sleep, inputs.day.as_ref())?;
    let preset = resolve_preset(inputs.preset, inputs.training_day, &mut journal);
    debug!(from = ?PlanStage::Normalize, to = ?PlanStage::Schedule, "plan stage");

    let mut run = PlanRun {
        inputs,
        config,
        normalized,
        base,
        preset,
        slots: Vec::new(),
        bounds: Vec::new(),
        policy: ValidationPolicy {
            kcal_tolerance: config.allocation.kcal_tolerance,
            ..ValidationPolicy::default()
        },
    };

    let mut stage = PlanStage::Schedule;
    for _ in 0..MAX_TRANSITIONS {
        if stage == PlanStage::Done {
            break;
        }
        stage = run.step(stage, &mut journal)?;
    }

    let (warnings, change_log) = journal.into_parts();
    let plan = MealPlan {
        slots: run.slots,
        warnings,
        change_log,
        targets: run.normalized.targets,
        preset_used: run.preset,
    };
    info!(
        slots = plan.slots.len(),
        kcal = plan.total_kcal(),
        warnings = plan.warnings.len(),
        preset = plan.preset_used.name(),
        "meal plan computed"
    );
    Ok(plan)
}

/// Compute a meal plan with the process-wide configuration
///
/// # Errors
///
/// Same as [`plan`].
pub fn plan_with_defaults(inputs: &PlanInputs) -> Result<MealPlan, PlanError> {
    plan(inputs, PlanConfig::global())
}
