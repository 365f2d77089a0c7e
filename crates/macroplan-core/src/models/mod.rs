// ABOUTME: Domain models for the meal-plan engine
// ABOUTME: Re-exports inputs, slots, bounds, targets, time base and report types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Every model is plain data with `serde` support so hosts can exchange plan
//! inputs and plans as JSON. A fresh set of these values is created per
//! engine invocation; nothing is shared between calls.

/// Per-slot macro bounds with provenance
pub mod bounds;
/// Plan inputs supplied by the host
pub mod inputs;
/// Macro identifiers and gram triples
pub mod nutrients;
/// Plan result, warnings and audit log
pub mod report;
/// Scheduled meal slots, roles and tags
pub mod slot;
/// Raw and normalized daily targets
pub mod targets;
/// Absolute-minute time base
pub mod time;

pub use bounds::{BoundSource, MacroBound, SlotBounds};
pub use inputs::{
    AnchorWindows, AutoFixLevel, EveningFatLimit, GymBlock, MacroLimits, NapBlock, OffsetWindow,
    PlanInputs, Preset, PreWorkoutStyle, SlotAttributes, TrainingKind, UserLimit,
};
pub use nutrients::{Macro, MacroGrams, MacroType};
pub use report::{ChangeLogEntry, MealPlan, Severity, Warning, WarningCode};
pub use slot::{Slot, SlotRole, SlotTags};
pub use targets::{RawNumber, RawTargets, Targets};
pub use time::{clock_label, DayAnchor, TimeBase};
