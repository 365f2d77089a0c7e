// ABOUTME: Macro nutrient identifiers and per-slot gram triples
// ABOUTME: Kcal is always derived from grams (4/4/9), never stored independently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three energy-bearing macronutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    /// Protein (4 kcal/g)
    Protein,
    /// Carbohydrate (4 kcal/g)
    Carbs,
    /// Fat (9 kcal/g)
    Fat,
}

impl Macro {
    /// All macros in declaration order
    pub const ALL: [Self; 3] = [Self::Protein, Self::Carbs, Self::Fat];

    /// Energy density in kcal per gram
    #[must_use]
    pub const fn kcal_per_gram(self) -> u32 {
        match self {
            Self::Protein => KCAL_PER_GRAM_PROTEIN,
            Self::Carbs => KCAL_PER_GRAM_CARBS,
            Self::Fat => KCAL_PER_GRAM_FAT,
        }
    }

    /// Upper-case code used in warning identifiers
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Protein => "PROTEIN",
            Self::Carbs => "CARBS",
            Self::Fat => "FAT",
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Protein => "protein",
            Self::Carbs => "carbs",
            Self::Fat => "fat",
        })
    }
}

/// Protein/carbohydrate/fat grams of one slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroGrams {
    /// Protein grams
    pub protein: u32,
    /// Carbohydrate grams
    pub carbs: u32,
    /// Fat grams
    pub fat: u32,
}

impl MacroGrams {
    /// Create a gram triple
    #[must_use]
    pub const fn new(protein: u32, carbs: u32, fat: u32) -> Self {
        Self {
            protein,
            carbs,
            fat,
        }
    }

    /// Grams of one macro
    #[must_use]
    pub const fn get(&self, nutrient: Macro) -> u32 {
        match nutrient {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Replace the grams of one macro
    pub fn set(&mut self, nutrient: Macro, grams: u32) {
        match nutrient {
            Macro::Protein => self.protein = grams,
            Macro::Carbs => self.carbs = grams,
            Macro::Fat => self.fat = grams,
        }
    }

    /// Derived energy: 4p + 4c + 9f
    #[must_use]
    pub const fn kcal(&self) -> u32 {
        self.protein * KCAL_PER_GRAM_PROTEIN
            + self.carbs * KCAL_PER_GRAM_CARBS
            + self.fat * KCAL_PER_GRAM_FAT
    }

    /// True when every macro is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.protein == 0 && self.carbs == 0 && self.fat == 0
    }
}

/// Per-slot carbohydrate emphasis chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroType {
    /// No emphasis
    #[default]
    Balanced,
    /// Carb-leaning meal
    HighCarb,
    /// Carb-light meal
    LowCarb,
}
