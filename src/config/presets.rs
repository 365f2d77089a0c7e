// ABOUTME: Carbohydrate weight tables per distribution preset and slot position
// ABOUTME: Each preset maps slot roles (and early/late mains) to relative carb weights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Preset Weight Configuration
//!
//! Weights are relative: only their ratios matter to the splitter. A main
//! slot counts as "late" when it sits in the second half of the waking
//! window.

use super::error::ConfigError;
use macroplan_core::models::Preset;
use serde::{Deserialize, Serialize};

/// Relative carbohydrate weight per slot position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    /// Breakfast anchor
    pub wake: f64,
    /// Pre-workout anchor
    pub pre: f64,
    /// Post-workout anchor
    pub post: f64,
    /// Meal-after-training anchor
    pub after_training: f64,
    /// Main meal in the first half of the day
    pub early_main: f64,
    /// Main meal in the second half of the day
    pub late_main: f64,
    /// Pre-sleep anchor
    pub sleep: f64,
}

impl RoleWeights {
    /// Every position weighted 1.0
    #[must_use]
    pub const fn uniform() -> Self {
        Self {
            wake: 1.0,
            pre: 1.0,
            post: 1.0,
            after_training: 1.0,
            early_main: 1.0,
            late_main: 1.0,
            sleep: 1.0,
        }
    }

    fn values(&self) -> [f64; 7] {
        [
            self.wake,
            self.pre,
            self.post,
            self.after_training,
            self.early_main,
            self.late_main,
            self.sleep,
        ]
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.values().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidWeights(name));
        }
        Ok(())
    }
}

/// Weight tables for every preset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetWeightsConfig {
    /// `standard`: pre/post-workout boosted, mains neutral
    pub standard: RoleWeights,
    /// `amCarbs`: breakfast boosted
    pub am_carbs: RoleWeights,
    /// `pmCarbs`: post-workout and late slots boosted
    pub pm_carbs: RoleWeights,
    /// `backload`: strongly evening-weighted
    pub backload: RoleWeights,
    /// `restAM`: rest-day morning lean
    pub rest_am: RoleWeights,
    /// Floor applied to every weight so the splitter never sees an all-zero vector
    pub epsilon: f64,
    /// Carb-weight multiplier for `high_carb` slots
    pub high_carb_multiplier: f64,
    /// Carb-weight multiplier for `low_carb` slots
    pub low_carb_multiplier: f64,
}

impl Default for PresetWeightsConfig {
    fn default() -> Self {
        Self {
            standard: RoleWeights {
                pre: 1.5,
                post: 1.75,
                sleep: 0.75,
                ..RoleWeights::uniform()
            },
            am_carbs: RoleWeights {
                wake: 1.75,
                pre: 1.25,
                post: 1.25,
                early_main: 1.25,
                late_main: 0.75,
                sleep: 0.5,
                ..RoleWeights::uniform()
            },
            pm_carbs: RoleWeights {
                wake: 0.75,
                post: 1.75,
                after_training: 1.35,
                late_main: 1.35,
                ..RoleWeights::uniform()
            },
            backload: RoleWeights {
                wake: 0.5,
                early_main: 0.75,
                post: 2.0,
                after_training: 1.5,
                late_main: 1.5,
                sleep: 1.25,
                ..RoleWeights::uniform()
            },
            rest_am: RoleWeights {
                wake: 1.5,
                early_main: 1.2,
                late_main: 0.8,
                sleep: 0.6,
                ..RoleWeights::uniform()
            },
            epsilon: 1e-3,
            high_carb_multiplier: 1.5,
            low_carb_multiplier: 0.5,
        }
    }
}

impl PresetWeightsConfig {
    /// Weight table of a preset; uniform presets share one table
    #[must_use]
    pub const fn for_preset(&self, preset: Preset) -> RoleWeights {
        match preset {
            Preset::Standard => self.standard,
            Preset::AmCarbs => self.am_carbs,
            Preset::PmCarbs => self.pm_carbs,
            Preset::Backload => self.backload,
            Preset::RestAm => self.rest_am,
            Preset::Even | Preset::RestEven | Preset::LeanPm => RoleWeights::uniform(),
        }
    }

    /// Validate every table
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWeights` for negative or non-finite weights
    /// and `ConfigError::ValueOutOfRange` for a non-positive epsilon or multiplier
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.standard.validate("standard preset weights")?;
        self.am_carbs.validate("amCarbs preset weights")?;
        self.pm_carbs.validate("pmCarbs preset weights")?;
        self.backload.validate("backload preset weights")?;
        self.rest_am.validate("restAM preset weights")?;
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "preset weight epsilon must be in (0, 1)",
            ));
        }
        if self.high_carb_multiplier <= 0.0 || self.low_carb_multiplier <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "macro-type carb multipliers must be positive",
            ));
        }
        Ok(())
    }
}
