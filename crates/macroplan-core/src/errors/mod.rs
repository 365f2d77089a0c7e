// ABOUTME: Error taxonomy for the meal-plan engine with stable error codes
// ABOUTME: Input-validation errors fail fast, invariant violations signal engine defects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Error Types
//!
//! Two tiers of failure leave the engine as errors:
//! - `PlanError::MissingKcal`, `NonPositiveKcal`, `EmptyMacroTargets` and
//!   `InvalidInput` are raised before any scheduling work and are
//!   user-correctable.
//! - `PlanError::Invariant` wraps an [`InvariantViolation`], which means the
//!   engine produced an inconsistent plan. These are defects, never retried.
//!
//! Recoverable conditions are not errors at all: they travel as warnings in
//! the returned plan.

mod invariant;

pub use invariant::InvariantViolation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Generic malformed input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Kcal target missing or unparseable
    #[serde(rename = "MISSING_KCAL")]
    MissingKcal = 3001,
    /// Kcal target zero or negative
    #[serde(rename = "NON_POSITIVE_KCAL")]
    NonPositiveKcal = 3002,
    /// Protein, carbohydrate and fat targets all zero
    #[serde(rename = "EMPTY_MACRO_TARGETS")]
    EmptyMacroTargets = 3003,

    // Internal Errors (9000-9999)
    /// The engine produced a plan that breaks a hard invariant
    #[serde(rename = "INVARIANT_VIOLATION")]
    InvariantViolation = 9000,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided plan input is invalid",
            Self::MissingKcal => "A daily kcal target is required",
            Self::NonPositiveKcal => "The daily kcal target must be positive",
            Self::EmptyMacroTargets => "At least one macro target must be non-zero",
            Self::InvariantViolation => "The meal-plan engine produced an inconsistent plan",
        }
    }

    /// Whether the caller can fix this error by changing the inputs
    #[must_use]
    pub const fn is_user_correctable(&self) -> bool {
        !matches!(self, Self::InvariantViolation)
    }
}

/// Errors returned by the meal-plan engine
#[derive(Debug, Error)]
pub enum PlanError {
    /// Kcal target absent or not a number
    #[error("kcal target is missing or not a number")]
    MissingKcal,

    /// Kcal target is zero or negative
    #[error("kcal target must be positive, got {kcal}")]
    NonPositiveKcal {
        /// The rejected value
        kcal: f64,
    },

    /// All three macro targets are zero after normalization
    #[error("protein, carbohydrate and fat targets are all zero")]
    EmptyMacroTargets,

    /// Structurally invalid input (time windows, gaps, blocks)
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending input field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Hard invariant broken by the engine itself
    #[error("plan invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl PlanError {
    /// Create an invalid-input error
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Stable error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingKcal => ErrorCode::MissingKcal,
            Self::NonPositiveKcal { .. } => ErrorCode::NonPositiveKcal,
            Self::EmptyMacroTargets => ErrorCode::EmptyMacroTargets,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::Invariant(_) => ErrorCode::InvariantViolation,
        }
    }
}
