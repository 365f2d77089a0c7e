// ABOUTME: Plan inputs supplied by the host application for one engine invocation
// ABOUTME: Wake/sleep window, training and nap blocks, targets, presets, and per-slot attributes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrients::{Macro, MacroType};
use super::targets::RawTargets;
use super::time::DayAnchor;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of training session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    /// Resistance training
    #[default]
    Strength,
    /// Endurance session
    Cardio,
    /// Mixed or circuit session
    Mixed,
    /// Team or skill sport
    Sport,
}

impl TrainingKind {
    /// Short label used in slot names
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
            Self::Mixed => "mixed",
            Self::Sport => "sport",
        }
    }
}

/// One training block of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymBlock {
    /// Session start
    pub start: NaiveTime,
    /// Session end
    pub end: NaiveTime,
    /// Session kind
    #[serde(default)]
    pub kind: TrainingKind,
    /// Higher wins when anchors of two blocks collide
    #[serde(default)]
    pub priority: u8,
}

/// One nap block; anchors falling inside are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapBlock {
    /// Nap start
    pub start: NaiveTime,
    /// Nap end
    pub end: NaiveTime,
}

/// Offset window (minutes) relative to the anchor's reference point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetWindow {
    /// Earliest offset
    pub min_offset: u32,
    /// Latest offset
    pub max_offset: u32,
}

impl OffsetWindow {
    /// Create a window
    #[must_use]
    pub const fn new(min_offset: u32, max_offset: u32) -> Self {
        Self {
            min_offset,
            max_offset,
        }
    }

    /// Midpoint of the window in minutes (fractional)
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min_offset) + f64::from(self.max_offset)) / 2.0
    }

    /// Whether `min_offset <= max_offset`
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.min_offset <= self.max_offset
    }
}

/// Per-anchor timing windows overriding the configured defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorWindows {
    /// Breakfast: minutes after wake
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<OffsetWindow>,
    /// Meal-length pre-workout: minutes before block start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_workout_meal: Option<OffsetWindow>,
    /// Snack-length pre-workout: minutes before block start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_workout_snack: Option<OffsetWindow>,
    /// Post-workout: minutes after block end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_workout: Option<OffsetWindow>,
    /// Meal after training: minutes after block end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_training: Option<OffsetWindow>,
    /// Pre-sleep: minutes before sleep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_sleep: Option<OffsetWindow>,
}

/// Named carbohydrate-distribution strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    /// Uniform carbohydrate weights
    Even,
    /// Pre/post-workout boosted, mains neutral
    #[default]
    Standard,
    /// Breakfast boosted
    AmCarbs,
    /// Post-workout and late slots boosted
    PmCarbs,
    /// Carbs pushed strongly towards the evening
    Backload,
    /// Rest-day uniform variant
    RestEven,
    /// Rest-day morning-leaning variant
    #[serde(rename = "restAM", alias = "restAm")]
    RestAm,
    /// Carb-neutral; caps late fat
    #[serde(rename = "leanPM", alias = "leanPm")]
    LeanPm,
}

impl Preset {
    /// Wire name of the preset
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Even => "even",
            Self::Standard => "standard",
            Self::AmCarbs => "amCarbs",
            Self::PmCarbs => "pmCarbs",
            Self::Backload => "backload",
            Self::RestEven => "restEven",
            Self::RestAm => "restAM",
            Self::LeanPm => "leanPM",
        }
    }
}

/// Pre-workout window length selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreWorkoutStyle {
    /// Snack window when the meal-count goal is high, meal window otherwise
    #[default]
    Auto,
    /// Force the meal-length window
    Meal,
    /// Force the snack-length window
    Snack,
}

/// How far the engine may go to repair an infeasible request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoFixLevel {
    /// Warn only; never weaken preset bounds
    Off,
    /// Nudge and drop main slots; weaken preset bounds with a warning
    #[default]
    Safe,
    /// Also merge colliding anchors and lower an infeasible meal-count goal
    Aggressive,
}

/// User minimum and/or cap for one macro of one slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLimit {
    /// Minimum grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    /// Maximum grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl UserLimit {
    /// Whether neither side is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Per-slot user limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroLimits {
    /// Protein limit
    #[serde(default)]
    pub protein: UserLimit,
    /// Carbohydrate limit
    #[serde(default)]
    pub carbs: UserLimit,
    /// Fat limit
    #[serde(default)]
    pub fat: UserLimit,
}

impl MacroLimits {
    /// Limit of one macro
    #[must_use]
    pub const fn get(&self, nutrient: Macro) -> UserLimit {
        match nutrient {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }
}

/// Optional attributes attached to a slot by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAttributes {
    /// Display-only dietary flag passed through to the slot
    #[serde(default)]
    pub no_lactose: bool,
    /// Carbohydrate emphasis
    #[serde(default)]
    pub macro_type: MacroType,
    /// Lock every macro of the slot to zero
    #[serde(default)]
    pub explicit_zero: bool,
    /// User minimum/cap per macro
    #[serde(default)]
    pub limits: MacroLimits,
}

/// Fat cap for every slot at or after a clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EveningFatLimit {
    /// Limit applies from this clock time on
    pub from: NaiveTime,
    /// Maximum fat grams per slot
    pub max_g: u32,
}

/// Everything one engine invocation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInputs {
    /// Wake time
    pub wake: NaiveTime,
    /// Sleep time (may be past midnight)
    pub sleep: NaiveTime,
    /// Optional calendar anchor for absolute-minute arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<DayAnchor>,
    /// Training blocks
    #[serde(default)]
    pub gym_blocks: Vec<GymBlock>,
    /// Nap blocks
    #[serde(default)]
    pub nap_blocks: Vec<NapBlock>,
    /// Daily targets from the macro calculator
    pub targets: RawTargets,
    /// Desired number of meals
    pub meals_target: u32,
    /// Minimum minutes between adjacent meals
    pub min_gap_min: u32,
    /// Preferred minutes between adjacent meals
    pub target_gap_min: u32,
    /// Carbohydrate distribution preset
    #[serde(default)]
    pub preset: Preset,
    /// Whether the day contains training
    #[serde(default = "default_true")]
    pub training_day: bool,
    /// Anchor window overrides
    #[serde(default)]
    pub anchor_windows: AnchorWindows,
    /// Attributes keyed by slot id
    #[serde(default)]
    pub slot_attributes: BTreeMap<String, SlotAttributes>,
    /// Protein floor for every main meal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_protein_floor_g: Option<u32>,
    /// Body weight used for protein floors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_weight_kg: Option<f64>,
    /// Fat cap for the pre-sleep slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nightly_fat_cap_g: Option<u32>,
    /// Minimum carbohydrate for pre-workout slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pre_workout_carbs_g: Option<u32>,
    /// Evening fat limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening_fat_limit: Option<EveningFatLimit>,
    /// Pre-workout window selection
    #[serde(default)]
    pub pre_workout_style: PreWorkoutStyle,
    /// Add a meal-after-training anchor per block
    #[serde(default)]
    pub meal_after_training: bool,
    /// Auto-fix level
    #[serde(default)]
    pub auto_fix: AutoFixLevel,
    /// Caller-supplied tie-break seed
    #[serde(default)]
    pub seed: u64,
}

const fn default_true() -> bool {
    true
}

impl PlanInputs {
    /// Inputs for a training day with default gaps (120/180 min) and four meals
    #[must_use]
    pub fn new(wake: NaiveTime, sleep: NaiveTime, targets: RawTargets) -> Self {
        Self {
            wake,
            sleep,
            day: None,
            gym_blocks: Vec::new(),
            nap_blocks: Vec::new(),
            targets,
            meals_target: 4,
            min_gap_min: 120,
            target_gap_min: 180,
            preset: Preset::default(),
            training_day: true,
            anchor_windows: AnchorWindows::default(),
            slot_attributes: BTreeMap::new(),
            main_protein_floor_g: None,
            body_weight_kg: None,
            nightly_fat_cap_g: None,
            min_pre_workout_carbs_g: None,
            evening_fat_limit: None,
            pre_workout_style: PreWorkoutStyle::default(),
            meal_after_training: false,
            auto_fix: AutoFixLevel::default(),
            seed: 0,
        }
    }

    /// Add a training block
    #[must_use]
    pub fn with_gym_block(mut self, block: GymBlock) -> Self {
        self.gym_blocks.push(block);
        self
    }

    /// Set the meal-count goal
    #[must_use]
    pub const fn with_meals_target(mut self, meals: u32) -> Self {
        self.meals_target = meals;
        self
    }

    /// Set the preset
    #[must_use]
    pub const fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Set the seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
