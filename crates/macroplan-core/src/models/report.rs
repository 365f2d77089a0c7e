// ABOUTME: Plan result contract: warnings, change-log audit entries, and the final meal plan
// ABOUTME: Warnings are recoverable and never abort; the change log is append-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::inputs::Preset;
use super::nutrients::{Macro, MacroGrams};
use super::slot::Slot;
use super::targets::Targets;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Warning severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; the plan follows the request
    Info,
    /// The plan deviates from the request
    Warning,
    /// A hard target could not be met
    Error,
}

/// Stable identifier of a recoverable condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Pre-workout slot sits closer than the minimum gap to breakfast
    PreWorkoutNearBreakfast,
    /// Post-workout slot more than the lateness threshold after block end
    PostWorkoutLate,
    /// Anchor outside the waking window or inside a nap
    AnchorDropped,
    /// Meal-count goal cannot be spaced by the minimum gap
    MealCountInfeasible,
    /// Anchors alone exceed the meal-count goal
    MealCountAboveGoal,
    /// Adjacent slots remain closer than the minimum gap
    MinGapViolation,
    /// Training preset replaced by its rest-day variant
    PresetRestSubstitute,
    /// A preset bound was relaxed to hit a target
    PresetWeakened,
    /// Protein total blocked by user limits
    ProteinUnachievableWithLimits,
    /// Carbohydrate total blocked by user limits
    CarbsUnachievableWithLimits,
    /// Fat total blocked by user limits
    FatUnachievableWithLimits,
    /// Kcal target blocked by bounds
    KcalTargetUnachievableWithLimits,
    /// A macro sum was moved off its gram target to meet kcal
    MacroDriftedForKcal,
    /// Protein floors exceed the daily protein target
    ProteinFloorShorted,
    /// Evening fat limit moved grams earlier in the day
    EveningFatLimitApplied,
    /// Two bound rules for one slot did not overlap
    BoundsConflict,
    /// Supplied targets could not be made kcal-coherent
    TargetsKcalMismatch,
    /// Slot list became empty; a fallback plan was built
    #[serde(rename = "plan-empty")]
    PlanEmpty,
}

impl WarningCode {
    /// The `*_UNACHIEVABLE_WITH_LIMITS` code of a macro
    #[must_use]
    pub const fn unachievable(nutrient: Macro) -> Self {
        match nutrient {
            Macro::Protein => Self::ProteinUnachievableWithLimits,
            Macro::Carbs => Self::CarbsUnachievableWithLimits,
            Macro::Fat => Self::FatUnachievableWithLimits,
        }
    }

    /// Wire string of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreWorkoutNearBreakfast => "PRE_WORKOUT_NEAR_BREAKFAST",
            Self::PostWorkoutLate => "POST_WORKOUT_LATE",
            Self::AnchorDropped => "ANCHOR_DROPPED",
            Self::MealCountInfeasible => "MEAL_COUNT_INFEASIBLE",
            Self::MealCountAboveGoal => "MEAL_COUNT_ABOVE_GOAL",
            Self::MinGapViolation => "MIN_GAP_VIOLATION",
            Self::PresetRestSubstitute => "PRESET_REST_SUBSTITUTE",
            Self::PresetWeakened => "PRESET_WEAKENED",
            Self::ProteinUnachievableWithLimits => "PROTEIN_UNACHIEVABLE_WITH_LIMITS",
            Self::CarbsUnachievableWithLimits => "CARBS_UNACHIEVABLE_WITH_LIMITS",
            Self::FatUnachievableWithLimits => "FAT_UNACHIEVABLE_WITH_LIMITS",
            Self::KcalTargetUnachievableWithLimits => "KCAL_TARGET_UNACHIEVABLE_WITH_LIMITS",
            Self::MacroDriftedForKcal => "MACRO_DRIFTED_FOR_KCAL",
            Self::ProteinFloorShorted => "PROTEIN_FLOOR_SHORTED",
            Self::EveningFatLimitApplied => "EVENING_FAT_LIMIT_APPLIED",
            Self::BoundsConflict => "BOUNDS_CONFLICT",
            Self::TargetsKcalMismatch => "TARGETS_KCAL_MISMATCH",
            Self::PlanEmpty => "plan-empty",
        }
    }

    /// Default severity of the code
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::PresetRestSubstitute | Self::EveningFatLimitApplied => Severity::Info,
            Self::ProteinUnachievableWithLimits
            | Self::CarbsUnachievableWithLimits
            | Self::FatUnachievableWithLimits
            | Self::KcalTargetUnachievableWithLimits => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable condition surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Severity
    pub severity: Severity,
    /// Stable code
    pub code: WarningCode,
    /// Human-readable explanation
    pub message: String,
    /// Suggested remedy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Warning {
    /// Warning with the code's default severity
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            fix: None,
        }
    }

    /// Attach a fix suggestion
    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Audit record of one automatic adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// Rule that made the change (`scheduler.merge`, `fixer.weaken`, ...)
    pub rule: String,
    /// Affected slot, when the change concerns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    /// Value before the change
    pub before: serde_json::Value,
    /// Value after the change
    pub after: serde_json::Value,
    /// Why the change was made
    pub reason: String,
}

impl ChangeLogEntry {
    /// Create an entry
    pub fn new(
        rule: impl Into<String>,
        before: impl Into<serde_json::Value>,
        after: impl Into<serde_json::Value>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            slot_id: None,
            before: before.into(),
            after: after.into(),
            reason: reason.into(),
        }
    }

    /// Attach the affected slot id
    #[must_use]
    pub fn for_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.slot_id = Some(slot_id.into());
        self
    }
}

/// Final engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Time-ordered meals
    pub slots: Vec<Slot>,
    /// Recoverable conditions
    pub warnings: Vec<Warning>,
    /// Audit trail of automatic adjustments
    pub change_log: Vec<ChangeLogEntry>,
    /// Normalized targets the plan was built against
    pub targets: Targets,
    /// Preset actually applied (after rest-day substitution)
    pub preset_used: Preset,
}

impl MealPlan {
    /// Summed grams over all slots
    #[must_use]
    pub fn totals(&self) -> MacroGrams {
        self.slots.iter().fold(MacroGrams::default(), |acc, slot| {
            MacroGrams::new(
                acc.protein + slot.macros.protein,
                acc.carbs + slot.macros.carbs,
                acc.fat + slot.macros.fat,
            )
        })
    }

    /// Summed kcal over all slots
    #[must_use]
    pub fn total_kcal(&self) -> u32 {
        self.slots.iter().map(Slot::kcal).sum()
    }

    /// Whether a warning with `code` was recorded
    #[must_use]
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Slot by id
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }
}
