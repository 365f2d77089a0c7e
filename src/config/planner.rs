// ABOUTME: Planner configuration with documented defaults and MACROPLAN_* environment overrides
// ABOUTME: Groups scheduling, allocation, preset weight, and iteration-cap tunables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::ConfigError;
use super::presets::PresetWeightsConfig;
use macroplan_core::models::OffsetWindow;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static PLAN_CONFIG: OnceLock<PlanConfig> = OnceLock::new();

/// Default anchor offset windows (minutes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDefaults {
    /// Breakfast, after wake
    pub breakfast: OffsetWindow,
    /// Meal-length pre-workout, before block start
    pub pre_workout_meal: OffsetWindow,
    /// Snack-length pre-workout, before block start
    pub pre_workout_snack: OffsetWindow,
    /// Post-workout, after block end
    pub post_workout: OffsetWindow,
    /// Meal after training, after block end
    pub after_training: OffsetWindow,
    /// Pre-sleep, before sleep
    pub pre_sleep: OffsetWindow,
}

impl Default for AnchorDefaults {
    fn default() -> Self {
        Self {
            breakfast: OffsetWindow::new(0, 60),
            pre_workout_meal: OffsetWindow::new(90, 150),
            pre_workout_snack: OffsetWindow::new(30, 60),
            post_workout: OffsetWindow::new(30, 60),
            after_training: OffsetWindow::new(90, 150),
            pre_sleep: OffsetWindow::new(30, 90),
        }
    }
}

/// Slot scheduling tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Anchor times snap to this many minutes
    pub snap_min: u32,
    /// Minimum distance between a workout anchor and its block boundary
    pub transport_buffer_min: u32,
    /// Adjacent slots closer than this are merged
    pub merge_threshold_min: u32,
    /// Most main slots inserted into one inter-anchor gap
    pub max_fill_per_gap: u32,
    /// A gap must be at least this multiple of the min gap to be split
    pub split_factor: f64,
    /// Smallest min-gap repair nudge
    pub nudge_min_step: u32,
    /// Largest min-gap repair nudge
    pub nudge_max_step: u32,
    /// Post-workout slot later than this after block end is reported
    pub post_workout_late_min: u32,
    /// `auto` pre-workout style picks the snack window at or above this meal goal
    pub snack_meal_goal: u32,
    /// Default anchor windows
    pub anchors: AnchorDefaults,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            snap_min: 15,
            transport_buffer_min: 15,
            merge_threshold_min: 60,
            max_fill_per_gap: 3,
            split_factor: 1.5,
            nudge_min_step: 15,
            nudge_max_step: 30,
            post_workout_late_min: 90,
            snack_meal_goal: 5,
            anchors: AnchorDefaults::default(),
        }
    }
}

/// Macro allocation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Allocation grid in grams
    pub step_g: u32,
    /// Pre/post-workout protein floor per kg body weight
    pub peri_workout_protein_g_per_kg: f64,
    /// Pre-sleep protein floor per kg body weight
    pub sleep_protein_g_per_kg: f64,
    /// Absolute pre/post-workout fat cap
    pub peri_workout_fat_cap_g: u32,
    /// Pre/post-workout fat cap as a share of daily fat
    pub peri_workout_fat_cap_share: f64,
    /// `leanPM` fat cap on the last main and the sleep slot
    pub lean_pm_fat_cap_g: u32,
    /// Accepted |Σkcal − target| after reconciliation
    pub kcal_tolerance: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            step_g: 5,
            peri_workout_protein_g_per_kg: 0.30,
            sleep_protein_g_per_kg: 0.45,
            peri_workout_fat_cap_g: 12,
            peri_workout_fat_cap_share: 0.05,
            lean_pm_fat_cap_g: 10,
            kcal_tolerance: 1,
        }
    }
}

/// Hard caps on internal loops
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationLimits {
    /// Cap for scheduler fill/split/trim/repair loops
    pub schedule: u32,
    /// Cap for fixer and reconciler distribution rounds
    pub distribution: u32,
}

impl Default for IterationLimits {
    fn default() -> Self {
        Self {
            schedule: 64,
            distribution: 512,
        }
    }
}

/// Planner configuration root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Slot scheduling
    pub schedule: ScheduleConfig,
    /// Macro allocation
    pub allocation: AllocationConfig,
    /// Preset carbohydrate weights
    pub presets: PresetWeightsConfig,
    /// Loop caps
    pub limits: IterationLimits,
}

impl PlanConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        PLAN_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load planner config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from defaults and environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first inconsistent value
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_schedule()?;
        self.validate_allocation()?;
        self.presets.validate()?;
        if self.limits.schedule == 0 || self.limits.distribution == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "iteration limits must be positive",
            ));
        }
        Ok(())
    }

    fn validate_schedule(&self) -> Result<(), ConfigError> {
        let sched = &self.schedule;
        if sched.snap_min == 0 || sched.snap_min > 60 {
            return Err(ConfigError::ValueOutOfRange(
                "snap_min must be between 1 and 60",
            ));
        }
        if sched.nudge_min_step == 0 || sched.nudge_min_step > sched.nudge_max_step {
            return Err(ConfigError::InvalidRange(
                "nudge_min_step must be positive and <= nudge_max_step",
            ));
        }
        if sched.split_factor < 1.0 || !sched.split_factor.is_finite() {
            return Err(ConfigError::ValueOutOfRange("split_factor must be >= 1.0"));
        }
        if sched.max_fill_per_gap == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_fill_per_gap must be positive",
            ));
        }
        let anchors = &sched.anchors;
        let ordered = [
            anchors.breakfast,
            anchors.pre_workout_meal,
            anchors.pre_workout_snack,
            anchors.post_workout,
            anchors.after_training,
            anchors.pre_sleep,
        ]
        .iter()
        .all(OffsetWindow::is_ordered);
        if !ordered {
            return Err(ConfigError::InvalidRange(
                "anchor windows must have min_offset <= max_offset",
            ));
        }
        Ok(())
    }

    fn validate_allocation(&self) -> Result<(), ConfigError> {
        let alloc = &self.allocation;
        if alloc.step_g == 0 || alloc.step_g > 50 {
            return Err(ConfigError::ValueOutOfRange(
                "step_g must be between 1 and 50",
            ));
        }
        let factor_ok = |f: f64| f.is_finite() && (0.0..=2.0).contains(&f);
        if !factor_ok(alloc.peri_workout_protein_g_per_kg)
            || !factor_ok(alloc.sleep_protein_g_per_kg)
        {
            return Err(ConfigError::ValueOutOfRange(
                "protein floor factors must be between 0 and 2 g/kg",
            ));
        }
        if !(alloc.peri_workout_fat_cap_share > 0.0 && alloc.peri_workout_fat_cap_share <= 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "peri_workout_fat_cap_share must be in (0, 1]",
            ));
        }
        if alloc.kcal_tolerance > 10 {
            return Err(ConfigError::ValueOutOfRange(
                "kcal_tolerance must not exceed 10",
            ));
        }
        Ok(())
    }

    /// Apply a single environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply `MACROPLAN_*` environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Scheduling
        Self::apply_env_var("MACROPLAN_SNAP_MIN", &mut self.schedule.snap_min)?;
        Self::apply_env_var(
            "MACROPLAN_TRANSPORT_BUFFER_MIN",
            &mut self.schedule.transport_buffer_min,
        )?;
        Self::apply_env_var(
            "MACROPLAN_MERGE_THRESHOLD_MIN",
            &mut self.schedule.merge_threshold_min,
        )?;
        Self::apply_env_var(
            "MACROPLAN_MAX_FILL_PER_GAP",
            &mut self.schedule.max_fill_per_gap,
        )?;
        Self::apply_env_var("MACROPLAN_SPLIT_FACTOR", &mut self.schedule.split_factor)?;
        Self::apply_env_var(
            "MACROPLAN_POST_WORKOUT_LATE_MIN",
            &mut self.schedule.post_workout_late_min,
        )?;

        // Allocation
        Self::apply_env_var("MACROPLAN_STEP_G", &mut self.allocation.step_g)?;
        Self::apply_env_var(
            "MACROPLAN_PERI_PROTEIN_G_PER_KG",
            &mut self.allocation.peri_workout_protein_g_per_kg,
        )?;
        Self::apply_env_var(
            "MACROPLAN_SLEEP_PROTEIN_G_PER_KG",
            &mut self.allocation.sleep_protein_g_per_kg,
        )?;
        Self::apply_env_var(
            "MACROPLAN_PERI_FAT_CAP_G",
            &mut self.allocation.peri_workout_fat_cap_g,
        )?;
        Self::apply_env_var(
            "MACROPLAN_LEAN_PM_FAT_CAP_G",
            &mut self.allocation.lean_pm_fat_cap_g,
        )?;
        Self::apply_env_var(
            "MACROPLAN_KCAL_TOLERANCE",
            &mut self.allocation.kcal_tolerance,
        )?;

        // Presets and loop caps
        Self::apply_env_var("MACROPLAN_WEIGHT_EPSILON", &mut self.presets.epsilon)?;
        Self::apply_env_var(
            "MACROPLAN_MAX_SCHEDULE_ITERATIONS",
            &mut self.limits.schedule,
        )?;
        Self::apply_env_var(
            "MACROPLAN_MAX_DISTRIBUTION_ITERATIONS",
            &mut self.limits.distribution,
        )?;

        Ok(self)
    }
}
