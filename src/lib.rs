// ABOUTME: Main library entry point for the macroplan meal-plan compute engine
// ABOUTME: Turns wake/sleep, training blocks and daily macro targets into timed meals with exact macros
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Macroplan
//!
//! A deterministic meal-plan compute engine. Given a day's wake and sleep
//! times, training blocks, and daily kcal/protein/carbohydrate/fat targets,
//! it schedules meal slots and distributes macros across them so that:
//!
//! - per-macro sums match the normalized targets exactly,
//! - total kcal lands within ±1 of the target,
//! - every slot lies inside the waking window, spaced by the minimum gap
//!   (merged slots excepted),
//! - identical inputs, seed included, always produce identical plans.
//!
//! Recoverable conditions are reported as [`Warning`]s on the returned
//! [`MealPlan`]; only bad input and engine defects are errors.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveTime;
//! use macroplan::{plan, GymBlock, PlanConfig, PlanInputs, RawTargets, TrainingKind};
//!
//! # fn main() -> Result<(), macroplan::PlanError> {
//! let wake = NaiveTime::from_hms_opt(6, 30, 0).unwrap_or_default();
//! let sleep = NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default();
//! let gym = GymBlock {
//!     start: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or_default(),
//!     end: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
//!     kind: TrainingKind::Strength,
//!     priority: 0,
//! };
//! let inputs = PlanInputs::new(wake, sleep, RawTargets::new(2800, 180, 340, 80))
//!     .with_gym_block(gym)
//!     .with_meals_target(5);
//!
//! let meal_plan = plan(&inputs, &PlanConfig::default())?;
//! for slot in &meal_plan.slots {
//!     println!("{} {} {:?}", slot.clock_label(), slot.label, slot.macros);
//! }
//! # Ok(())
//! # }
//! ```

/// Planner configuration and environment overrides
pub mod config;

/// Scheduling and macro-distribution stages
pub mod engine;

/// Host-side logging bootstrap
pub mod logging;

pub use config::{ConfigError, PlanConfig};
pub use engine::orchestrator::{plan, plan_with_defaults, PlanStage};
pub use macroplan_core::models::{
    AnchorWindows, AutoFixLevel, ChangeLogEntry, DayAnchor, EveningFatLimit, GymBlock, Macro,
    MacroGrams, MacroLimits, MacroType, MealPlan, NapBlock, OffsetWindow, PlanInputs, Preset,
    PreWorkoutStyle, RawNumber, RawTargets, Severity, Slot, SlotAttributes, SlotRole, SlotTags,
    Targets, TimeBase, TrainingKind, UserLimit, Warning, WarningCode,
};
pub use macroplan_core::{ErrorCode, InvariantViolation, PlanError};
