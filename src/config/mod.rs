// ABOUTME: Planner configuration module
// ABOUTME: Re-exports tunables, preset weight tables, and configuration errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Planner Configuration Module
//!
//! Every tunable constant of the engine lives here with a documented default.
//!
//! # Configuration Methods
//!
//! 1. Environment variables (highest priority):
//!    ```bash
//!    export MACROPLAN_STEP_G=5
//!    export MACROPLAN_MERGE_THRESHOLD_MIN=60
//!    ```
//!
//! 2. Default values (if env vars not set)
//!
//! Engine operations take `&PlanConfig` explicitly; [`PlanConfig::global`]
//! exists for hosts that want one process-wide instance.

pub mod error;
pub mod planner;
pub mod presets;

pub use error::ConfigError;
pub use planner::{AllocationConfig, AnchorDefaults, IterationLimits, PlanConfig, ScheduleConfig};
pub use presets::{PresetWeightsConfig, RoleWeights};
