// ABOUTME: Raw daily macro/kcal targets as supplied and their normalized integer form
// ABOUTME: Raw values accept numbers or locale-formatted strings from upstream calculators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::nutrients::{Macro, MacroGrams};
use serde::{Deserialize, Serialize};

/// A target value before parsing: a JSON number or a string such as `"2 800"` or `"72,5"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// Already numeric
    Number(f64),
    /// Text to be parsed defensively
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for RawNumber {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Possibly partial daily targets from the macro-target calculator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTargets {
    /// Daily energy target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kcal: Option<RawNumber>,
    /// Daily protein grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<RawNumber>,
    /// Daily carbohydrate grams (derived from the remainder when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<RawNumber>,
    /// Daily fat grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<RawNumber>,
}

impl RawTargets {
    /// Fully specified numeric targets
    #[must_use]
    pub fn new(kcal: u32, protein: u32, carbs: u32, fat: u32) -> Self {
        Self {
            kcal: Some(kcal.into()),
            protein: Some(protein.into()),
            carbs: Some(carbs.into()),
            fat: Some(fat.into()),
        }
    }
}

/// Normalized, mutually coherent integer targets
///
/// After normalization `kcal` and `4p + 4c + 9f` differ by at most the
/// reconciler tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Targets {
    /// Daily energy target
    pub kcal: u32,
    /// Daily protein grams
    pub protein: u32,
    /// Daily carbohydrate grams
    pub carbs: u32,
    /// Daily fat grams
    pub fat: u32,
}

impl Targets {
    /// Target grams of one macro
    #[must_use]
    pub const fn get(&self, nutrient: Macro) -> u32 {
        match nutrient {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Gram targets as a triple
    #[must_use]
    pub const fn grams(&self) -> MacroGrams {
        MacroGrams::new(self.protein, self.carbs, self.fat)
    }

    /// Energy implied by the gram targets
    #[must_use]
    pub const fn macro_kcal(&self) -> u32 {
        self.grams().kcal()
    }

    /// Signed difference `kcal - macro_kcal()`
    #[must_use]
    pub fn kcal_residual(&self) -> i64 {
        i64::from(self.kcal) - i64::from(self.macro_kcal())
    }
}
