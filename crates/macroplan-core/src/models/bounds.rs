// ABOUTME: Per-slot, per-macro [min, max] bounds tagged with their provenance
// ABOUTME: User bounds are inviolable; preset bounds may be weakened under infeasibility
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrients::Macro;
use serde::{Deserialize, Serialize};

/// Origin of a bound, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundSource {
    /// No constraint beyond non-negativity
    #[default]
    None,
    /// Engine policy from the chosen preset; relaxable
    Preset,
    /// Set by the user; never relaxed
    User,
}

/// Inclusive gram range for one macro of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroBound {
    /// Minimum grams
    pub min: u32,
    /// Maximum grams, `None` for unbounded
    pub max: Option<u32>,
    /// Provenance
    pub source: BoundSource,
}

impl Default for MacroBound {
    fn default() -> Self {
        Self::open()
    }
}

impl MacroBound {
    /// `[0, ∞)` with no provenance
    #[must_use]
    pub const fn open() -> Self {
        Self {
            min: 0,
            max: None,
            source: BoundSource::None,
        }
    }

    /// `[0, 0]` locked by the user
    #[must_use]
    pub const fn locked_zero() -> Self {
        Self {
            min: 0,
            max: Some(0),
            source: BoundSource::User,
        }
    }

    /// Arbitrary bound
    #[must_use]
    pub const fn new(min: u32, max: Option<u32>, source: BoundSource) -> Self {
        Self { min, max, source }
    }

    /// Whether `grams` satisfies the bound
    #[must_use]
    pub fn contains(&self, grams: u32) -> bool {
        grams >= self.min && self.max.is_none_or(|max| grams <= max)
    }

    /// Clamp `grams` into the bound
    #[must_use]
    pub fn clamp(&self, grams: u32) -> u32 {
        let low = grams.max(self.min);
        self.max.map_or(low, |max| low.min(max))
    }

    /// Room to grow from `grams` (`u32::MAX` when unbounded)
    #[must_use]
    pub fn headroom(&self, grams: u32) -> u32 {
        self.max.map_or(u32::MAX, |max| max.saturating_sub(grams))
    }

    /// Room to shrink from `grams`
    #[must_use]
    pub const fn slack(&self, grams: u32) -> u32 {
        grams.saturating_sub(self.min)
    }
}

/// Bounds of all three macros of one slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotBounds {
    /// Protein bound
    pub protein: MacroBound,
    /// Carbohydrate bound
    pub carbs: MacroBound,
    /// Fat bound
    pub fat: MacroBound,
}

impl SlotBounds {
    /// Every macro locked to zero
    #[must_use]
    pub const fn locked_zero() -> Self {
        Self {
            protein: MacroBound::locked_zero(),
            carbs: MacroBound::locked_zero(),
            fat: MacroBound::locked_zero(),
        }
    }

    /// Bound of one macro
    #[must_use]
    pub const fn get(&self, nutrient: Macro) -> MacroBound {
        match nutrient {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Mutable bound of one macro
    pub fn get_mut(&mut self, nutrient: Macro) -> &mut MacroBound {
        match nutrient {
            Macro::Protein => &mut self.protein,
            Macro::Carbs => &mut self.carbs,
            Macro::Fat => &mut self.fat,
        }
    }
}
