// ABOUTME: Scheduled meal slots with role variants and role-tag sets
// ABOUTME: Roles carry their own timing constraints; tags record merges and anchor status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::inputs::MacroLimits;
use super::nutrients::{MacroGrams, MacroType};
use super::time::clock_label;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Role tags of a slot; merged slots carry the union of their parts
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SlotTags: u8 {
        /// Breakfast after waking
        const WAKE = 0b0000_0001;
        /// Before a training block
        const PRE = 0b0000_0010;
        /// After a training block
        const POST = 0b0000_0100;
        /// Last meal before sleep
        const SLEEP = 0b0000_1000;
        /// A regular meal
        const MAIN = 0b0001_0000;
        /// Result of merging two close slots
        const MERGED = 0b0010_0000;
        /// Time derived from an anchor window rather than free placement
        const ANCHOR = 0b0100_0000;
    }
}

/// Primary role of a slot, with the constraints that role imposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotRole {
    /// Breakfast anchor
    Wake,
    /// Pre-workout anchor; must not move past `latest`
    Pre {
        /// Index of the training block
        block: usize,
        /// Latest allowed minute (block start minus transport buffer)
        latest: i32,
    },
    /// Post-workout anchor; must not move before `earliest`
    Post {
        /// Index of the training block
        block: usize,
        /// Earliest allowed minute (block end plus transport buffer)
        earliest: i32,
    },
    /// Meal-after-training anchor
    AfterTraining {
        /// Index of the training block
        block: usize,
    },
    /// Pre-sleep anchor
    Sleep,
    /// Freely placed main meal
    Main,
}

impl SlotRole {
    /// Tags implied by the role alone
    #[must_use]
    pub const fn base_tags(self) -> SlotTags {
        match self {
            Self::Wake => SlotTags::WAKE.union(SlotTags::ANCHOR),
            Self::Pre { .. } => SlotTags::PRE.union(SlotTags::ANCHOR),
            Self::Post { .. } => SlotTags::POST.union(SlotTags::ANCHOR),
            Self::AfterTraining { .. } => SlotTags::MAIN.union(SlotTags::ANCHOR),
            Self::Sleep => SlotTags::SLEEP.union(SlotTags::ANCHOR),
            Self::Main => SlotTags::MAIN,
        }
    }

    /// Merge priority; the higher role survives a merge
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Pre { .. } => 6,
            Self::Post { .. } => 5,
            Self::Sleep => 4,
            Self::Wake => 3,
            Self::AfterTraining { .. } => 2,
            Self::Main => 1,
        }
    }

    /// Earliest minute the role tolerates
    #[must_use]
    pub const fn earliest(self) -> Option<i32> {
        match self {
            Self::Post { earliest, .. } => Some(earliest),
            _ => None,
        }
    }

    /// Latest minute the role tolerates
    #[must_use]
    pub const fn latest(self) -> Option<i32> {
        match self {
            Self::Pre { latest, .. } => Some(latest),
            _ => None,
        }
    }
}

/// One scheduled meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Stable identifier (`wake`, `pre-0`, `main-2`, ...)
    pub id: String,
    /// Absolute minute on the day's axis
    pub time: i32,
    /// Display label
    pub label: String,
    /// Primary role
    pub role: SlotRole,
    /// Role tags
    pub tags: SlotTags,
    /// Allocated grams
    pub macros: MacroGrams,
    /// All macros locked to zero by the user
    #[serde(default)]
    pub explicit_zero: bool,
    /// Display-only dietary flag
    #[serde(default)]
    pub no_lactose: bool,
    /// Carbohydrate emphasis
    #[serde(default)]
    pub macro_type: MacroType,
    /// Per-slot user minimum/cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<MacroLimits>,
    /// Minutes from `time` to the local wall clock after a UTC-offset change
    #[serde(default, skip_serializing_if = "is_zero")]
    pub clock_shift_min: i32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i32) -> bool {
    *value == 0
}

impl Slot {
    /// Create an empty slot for a role
    pub fn new(id: impl Into<String>, time: i32, label: impl Into<String>, role: SlotRole) -> Self {
        Self {
            id: id.into(),
            time,
            label: label.into(),
            role,
            tags: role.base_tags(),
            macros: MacroGrams::default(),
            explicit_zero: false,
            no_lactose: false,
            macro_type: MacroType::default(),
            limits: None,
            clock_shift_min: 0,
        }
    }

    /// Derived energy of the slot
    #[must_use]
    pub const fn kcal(&self) -> u32 {
        self.macros.kcal()
    }

    /// Whether the slot carries a tag
    #[must_use]
    pub const fn has(&self, tag: SlotTags) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the slot time came from an anchor window
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        self.tags.contains(SlotTags::ANCHOR)
    }

    /// Wall-clock `HH:MM` of the slot
    #[must_use]
    pub fn clock_label(&self) -> String {
        clock_label(self.time + self.clock_shift_min)
    }
}
