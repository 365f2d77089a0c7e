// ABOUTME: Core types and constants for the macroplan meal-plan engine
// ABOUTME: Foundation crate with error handling, domain models, and nutrition constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Macroplan Core
//!
//! Foundation crate providing shared types and constants for the macroplan
//! meal-plan compute engine. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `PlanError`, `ErrorCode`, and the defect-class `InvariantViolation`
//! - **constants**: Energy densities, clock arithmetic, and stable slot identifiers
//! - **models**: Plan inputs, slots, bounds, targets, warnings, and the change log

/// Unified error handling with stable error codes
pub mod errors;

/// Nutrition and scheduling constants organized by domain
pub mod constants;

/// Domain models (inputs, slots, bounds, targets, report types)
pub mod models;

pub use errors::{ErrorCode, InvariantViolation, PlanError};
