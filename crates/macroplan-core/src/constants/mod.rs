// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Energy densities, clock arithmetic, and stable slot identifiers for the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Pure data constants grouped by domain. Tunable policy values (gaps, caps,
//! preset boosts) live in the engine configuration instead.

/// Atwater energy densities
pub mod energy {
    /// Protein kcal per gram
    pub const KCAL_PER_GRAM_PROTEIN: u32 = 4;
    /// Carbohydrate kcal per gram
    pub const KCAL_PER_GRAM_CARBS: u32 = 4;
    /// Fat kcal per gram
    pub const KCAL_PER_GRAM_FAT: u32 = 9;
}

/// Clock arithmetic
pub mod clock {
    /// Minutes in one calendar day
    pub const MINUTES_PER_DAY: i32 = 1440;
    /// Minutes in one hour
    pub const MINUTES_PER_HOUR: i32 = 60;
}

/// Stable slot identifiers
pub mod slot_ids {
    /// Breakfast anchor
    pub const WAKE: &str = "wake";
    /// Pre-sleep anchor
    pub const SLEEP: &str = "sleep";
    /// Prefix for pre-workout anchors (`pre-{block}`)
    pub const PRE_PREFIX: &str = "pre";
    /// Prefix for post-workout anchors (`post-{block}`)
    pub const POST_PREFIX: &str = "post";
    /// Prefix for meal-after-training anchors (`after-{block}`)
    pub const AFTER_PREFIX: &str = "after";
    /// Prefix for free main meals (`main-{n}`)
    pub const MAIN_PREFIX: &str = "main";
    /// Single slot of a rebuilt fallback plan
    pub const FALLBACK: &str = "fallback";
}
