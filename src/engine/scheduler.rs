// ABOUTME: Anchor/slot scheduler building the time-ordered slot list before any macros exist
// ABOUTME: Places anchors, fills and splits gaps, trims to the meal goal, merges close slots, repairs min gap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Slot Scheduler
//!
//! Stages, in order:
//!
//! 1. Feasibility of the meal-count goal against the window and min gap
//! 2. Anchors: breakfast, pre/post-workout per block, meal after training, pre-sleep
//! 3. Fill inter-anchor gaps with evenly spaced main slots
//! 4. Split the largest gap while below the goal
//! 5. Remove main slots while above the goal
//! 6. Merge slots closer than the merge threshold
//! 7. Repair remaining min-gap violations according to the auto-fix level
//!
//! Every loop is capped by `IterationLimits::schedule`.

use super::{minutes, Journal};
use crate::config::{AnchorDefaults, PlanConfig, ScheduleConfig};
use macroplan_core::constants::slot_ids;
use macroplan_core::models::{
    AutoFixLevel, ChangeLogEntry, OffsetWindow, PlanInputs, PreWorkoutStyle, Slot, SlotRole,
    SlotTags, TimeBase, TrainingKind, UserLimit, Warning, WarningCode,
};
use macroplan_core::PlanError;
use serde_json::json;
use std::cmp::Reverse;
use tracing::debug;

/// Placeholder label of a main slot until final numbering
const MAIN_LABEL: &str = "Meal";

/// Training block placed on the day's minute axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedBlock {
    /// Position in start-time order
    pub index: usize,
    /// Absolute start minute
    pub start: i32,
    /// Absolute end minute
    pub end: i32,
    /// Session kind
    pub kind: TrainingKind,
    /// Collision priority
    pub priority: u8,
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    start: i32,
    end: i32,
}

/// Snap a minute value to the nearest multiple of `step`, halves rounding up
#[must_use]
pub fn snap(value: f64, step: u32) -> i32 {
    let step = f64::from(step.max(1));
    ((value / step + 0.5).floor() * step) as i32
}

/// Place the training blocks on the minute axis in start-time order
///
/// # Errors
///
/// Returns `PlanError::InvalidInput` when a block does not end after it starts
pub fn place_blocks(inputs: &PlanInputs, base: TimeBase) -> Result<Vec<PlacedBlock>, PlanError> {
    let mut placed = Vec::with_capacity(inputs.gym_blocks.len());
    for block in &inputs.gym_blocks {
        let start = base.place(block.start);
        let mut end = base.place(block.end);
        if end <= start && block.end > block.start {
            end = start + (end - start).rem_euclid(1440);
        }
        if end <= start {
            return Err(PlanError::invalid_input(
                "gym_blocks",
                "block end must be after its start",
            ));
        }
        placed.push(PlacedBlock {
            index: 0,
            start,
            end,
            kind: block.kind,
            priority: block.priority,
        });
    }
    placed.sort_by_key(|b| (b.start, Reverse(b.priority)));
    for (index, block) in placed.iter_mut().enumerate() {
        block.index = index;
    }
    Ok(placed)
}

fn place_naps(inputs: &PlanInputs, base: TimeBase) -> Result<Vec<Interval>, PlanError> {
    inputs
        .nap_blocks
        .iter()
        .map(|nap| {
            let start = base.place(nap.start);
            let end = base.place(nap.end);
            if end <= start {
                return Err(PlanError::invalid_input(
                    "nap_blocks",
                    "nap end must be after its start",
                ));
            }
            Ok(Interval { start, end })
        })
        .collect()
}

/// Anchor windows after applying per-request overrides
#[derive(Debug, Clone, Copy)]
struct Windows {
    breakfast: OffsetWindow,
    pre_workout: OffsetWindow,
    post_workout: OffsetWindow,
    after_training: OffsetWindow,
    pre_sleep: OffsetWindow,
    pre_is_snack: bool,
}

fn resolve_windows(
    inputs: &PlanInputs,
    defaults: &AnchorDefaults,
    snack_goal: u32,
) -> Result<Windows, PlanError> {
    let overrides = &inputs.anchor_windows;
    let pre_is_snack = match inputs.pre_workout_style {
        PreWorkoutStyle::Snack => true,
        PreWorkoutStyle::Meal => false,
        PreWorkoutStyle::Auto => inputs.meals_target >= snack_goal,
    };
    let pre_workout = if pre_is_snack {
        overrides
            .pre_workout_snack
            .unwrap_or(defaults.pre_workout_snack)
    } else {
        overrides
            .pre_workout_meal
            .unwrap_or(defaults.pre_workout_meal)
    };
    let windows = Windows {
        breakfast: overrides.breakfast.unwrap_or(defaults.breakfast),
        pre_workout,
        post_workout: overrides.post_workout.unwrap_or(defaults.post_workout),
        after_training: overrides.after_training.unwrap_or(defaults.after_training),
        pre_sleep: overrides.pre_sleep.unwrap_or(defaults.pre_sleep),
        pre_is_snack,
    };
    let all = [
        windows.breakfast,
        windows.pre_workout,
        windows.post_workout,
        windows.after_training,
        windows.pre_sleep,
    ];
    if !all.iter().all(OffsetWindow::is_ordered) {
        return Err(PlanError::invalid_input(
            "anchor_windows",
            "min_offset must not exceed max_offset",
        ));
    }
    Ok(windows)
}

fn validate_inputs(inputs: &PlanInputs) -> Result<(), PlanError> {
    if inputs.meals_target == 0 {
        return Err(PlanError::invalid_input(
            "meals_target",
            "at least one meal is required",
        ));
    }
    if inputs.min_gap_min == 0 {
        return Err(PlanError::invalid_input(
            "min_gap_min",
            "minimum gap must be positive",
        ));
    }
    if inputs.target_gap_min == 0 {
        return Err(PlanError::invalid_input(
            "target_gap_min",
            "target gap must be positive",
        ));
    }
    Ok(())
}

/// Build the time-ordered slot list for one day
///
/// # Errors
///
/// Returns `PlanError::InvalidInput` for a zero meal goal or gap, inverted
/// anchor windows, or blocks that end before they start. Scheduling
/// infeasibility is never an error; it is journaled as a warning.
pub fn schedule(
    inputs: &PlanInputs,
    base: TimeBase,
    config: &PlanConfig,
    journal: &mut Journal,
) -> Result<Vec<Slot>, PlanError> {
    validate_inputs(inputs)?;
    let windows = resolve_windows(
        inputs,
        &config.schedule.anchors,
        config.schedule.snack_meal_goal,
    )?;
    let blocks = place_blocks(inputs, base)?;
    let naps = place_naps(inputs, base)?;

    let min_gap = minutes(inputs.min_gap_min);
    let mut scheduler = Scheduler {
        config: &config.schedule,
        base,
        blocks,
        naps,
        min_gap,
        target_gap: minutes(inputs.target_gap_min).max(min_gap),
        goal: inputs.meals_target as usize,
        auto_fix: inputs.auto_fix,
        max_iterations: config.limits.schedule,
    };

    scheduler.check_feasibility(journal);
    let anchors = scheduler.anchors(&windows, inputs.meal_after_training, journal);
    let filled = scheduler.fill(anchors);
    let split = scheduler.split_gaps(filled, journal);
    if split.len() < scheduler.goal && !journal.has(WarningCode::MealCountInfeasible) {
        journal.warn(
            Warning::new(
                WarningCode::MealCountInfeasible,
                format!(
                    "only {} of {} meals fit with a {} min minimum gap",
                    split.len(),
                    scheduler.goal,
                    scheduler.min_gap
                ),
            )
            .with_fix(format!(
                "plan {} meals or lower the minimum gap",
                split.len()
            )),
        );
    }
    let trimmed = scheduler.trim_to_goal(split, journal);
    let merged = scheduler.merge_close(trimmed, journal);
    let repaired = scheduler.enforce_min_gap(merged, journal);
    scheduler.report_anchor_timing(&repaired, journal);

    let slots = finalize(repaired, inputs);
    debug!(
        slots = slots.len(),
        goal = scheduler.goal,
        "schedule built"
    );
    Ok(slots)
}

struct Scheduler<'a> {
    config: &'a ScheduleConfig,
    base: TimeBase,
    blocks: Vec<PlacedBlock>,
    naps: Vec<Interval>,
    min_gap: i32,
    target_gap: i32,
    goal: usize,
    auto_fix: AutoFixLevel,
    max_iterations: u32,
}

impl Scheduler<'_> {
    fn buffer(&self) -> i32 {
        minutes(self.config.transport_buffer_min)
    }

    fn snap_offset(&self, window: OffsetWindow) -> i32 {
        snap(window.midpoint(), self.config.snap_min)
    }

    /// Report a goal that cannot be spaced by the min gap; aggressive mode lowers it
    fn check_feasibility(&mut self, journal: &mut Journal) {
        let window = i64::from(self.base.window_len());
        let min_gap = i64::from(self.min_gap);
        let goal = i64::try_from(self.goal).unwrap_or(i64::MAX);
        if goal * min_gap < window {
            return;
        }
        let suggested = ((window - 1) / min_gap).max(1) as usize;
        let snap_step = i64::from(self.config.snap_min.max(1));
        let suggested_gap = ((window - 1) / goal) / snap_step * snap_step;
        journal.warn(
            Warning::new(
                WarningCode::MealCountInfeasible,
                format!(
                    "{} meals need {} min but the waking window is {} min",
                    self.goal,
                    goal * min_gap,
                    window
                ),
            )
            .with_fix(format!(
                "plan at most {suggested} meals, or lower the minimum gap to {suggested_gap} min"
            )),
        );
        if self.auto_fix == AutoFixLevel::Aggressive && suggested < self.goal {
            journal.record(ChangeLogEntry::new(
                "scheduler.lower_goal",
                json!(self.goal),
                json!(suggested),
                "meal-count goal infeasible under the minimum gap",
            ));
            self.goal = suggested;
        }
    }

    fn in_training(&self, time: i32) -> bool {
        self.blocks.iter().any(|b| time > b.start && time < b.end)
    }

    fn in_nap(&self, time: i32) -> bool {
        self.naps.iter().any(|n| time >= n.start && time <= n.end)
    }

    /// Whether a free main slot may not be placed at `time`
    fn blocked(&self, time: i32) -> bool {
        let buffer = self.buffer();
        self.in_nap(time)
            || self
                .blocks
                .iter()
                .any(|b| time > b.start - buffer && time < b.end + buffer)
    }

    fn anchors(
        &self,
        windows: &Windows,
        meal_after_training: bool,
        journal: &mut Journal,
    ) -> Vec<Slot> {
        let wake = self.base.wake;
        let sleep = self.base.sleep;
        let buffer = self.buffer();
        let mut candidates = vec![Slot::new(
            slot_ids::WAKE,
            wake + self.snap_offset(windows.breakfast),
            "Breakfast",
            SlotRole::Wake,
        )];

        for block in &self.blocks {
            let b = block.index;
            let kind = block.kind.label();
            let latest = block.start - buffer;
            let pre_label = if windows.pre_is_snack {
                format!("Pre-workout snack ({kind})")
            } else {
                format!("Pre-workout meal ({kind})")
            };
            if latest >= wake {
                let time = (block.start - self.snap_offset(windows.pre_workout)).clamp(wake, latest);
                candidates.push(Slot::new(
                    format!("{}-{b}", slot_ids::PRE_PREFIX),
                    time,
                    pre_label,
                    SlotRole::Pre { block: b, latest },
                ));
            } else {
                drop_anchor(
                    journal,
                    &format!("{}-{b}", slot_ids::PRE_PREFIX),
                    "no room between wake and block start",
                );
            }

            let earliest = block.end + buffer;
            if earliest <= sleep {
                let time = (block.end + self.snap_offset(windows.post_workout)).clamp(earliest, sleep);
                candidates.push(Slot::new(
                    format!("{}-{b}", slot_ids::POST_PREFIX),
                    time,
                    format!("Post-workout ({kind})"),
                    SlotRole::Post { block: b, earliest },
                ));
            } else {
                drop_anchor(
                    journal,
                    &format!("{}-{b}", slot_ids::POST_PREFIX),
                    "no room between block end and sleep",
                );
            }

            if meal_after_training {
                candidates.push(Slot::new(
                    format!("{}-{b}", slot_ids::AFTER_PREFIX),
                    block.end + self.snap_offset(windows.after_training),
                    "Meal after training",
                    SlotRole::AfterTraining { block: b },
                ));
            }
        }

        candidates.push(Slot::new(
            slot_ids::SLEEP,
            sleep - self.snap_offset(windows.pre_sleep),
            "Pre-sleep",
            SlotRole::Sleep,
        ));

        let mut anchors: Vec<Slot> = candidates
            .into_iter()
            .filter(|slot| {
                let reason = if !self.base.contains(slot.time) {
                    Some("outside the waking window")
                } else if self.in_nap(slot.time) {
                    Some("inside a nap")
                } else if self.in_training(slot.time) {
                    Some("inside a training block")
                } else {
                    None
                };
                match reason {
                    Some(reason) => {
                        drop_anchor(journal, &slot.id, reason);
                        false
                    }
                    None => true,
                }
            })
            .collect();
        anchors.sort_by_key(|s| (s.time, Reverse(s.role.priority())));
        anchors
    }

    fn fill_positions(&self, from: i32, to: i32) -> Vec<i32> {
        let gap = to - from;
        if gap <= 0 {
            return Vec::new();
        }
        let wanted = (gap + self.target_gap - 1) / self.target_gap - 1;
        let mut count = wanted.clamp(0, minutes(self.config.max_fill_per_gap));
        while count > 0 && gap < self.min_gap * (count + 1) {
            count -= 1;
        }
        (1..=count)
            .map(|k| {
                snap(
                    f64::from(from) + f64::from(gap) * f64::from(k) / f64::from(count + 1),
                    self.config.snap_min,
                )
            })
            .filter(|&t| t > from && t < to && !self.blocked(t))
            .collect()
    }

    /// Insert evenly spaced main slots between consecutive anchors
    fn fill(&self, anchors: Vec<Slot>) -> Vec<Slot> {
        let mut bounds = Vec::with_capacity(anchors.len() + 2);
        bounds.push(self.base.wake);
        bounds.extend(anchors.iter().map(|s| s.time));
        bounds.push(self.base.sleep);

        let mut slots = anchors;
        for pair in bounds.windows(2) {
            for time in self.fill_positions(pair[0], pair[1]) {
                slots.push(Slot::new(slot_ids::MAIN_PREFIX, time, MAIN_LABEL, SlotRole::Main));
            }
        }
        slots.sort_by_key(|s| (s.time, Reverse(s.role.priority())));
        slots
    }

    /// Split the largest safe gap until the goal is met or no gap qualifies
    fn split_gaps(&self, mut slots: Vec<Slot>, journal: &mut Journal) -> Vec<Slot> {
        let threshold = f64::from(self.min_gap) * self.config.split_factor;
        for _ in 0..self.max_iterations {
            if slots.len() >= self.goal {
                break;
            }
            let best = slots
                .windows(2)
                .enumerate()
                .filter_map(|(i, pair)| {
                    let gap = pair[1].time - pair[0].time;
                    let mid = snap(
                        f64::from(pair[0].time) + f64::from(gap) / 2.0,
                        self.config.snap_min,
                    );
                    let fits = f64::from(gap) >= threshold
                        && mid - pair[0].time >= self.min_gap
                        && pair[1].time - mid >= self.min_gap
                        && !self.blocked(mid);
                    fits.then_some((i, gap, mid))
                })
                .max_by_key(|&(i, gap, _)| (gap, Reverse(i)));
            let Some((i, gap, mid)) = best else {
                break;
            };
            journal.record(ChangeLogEntry::new(
                "scheduler.split_gap",
                json!({ "gap_min": gap }),
                json!({ "inserted_at": mid }),
                "meal count below goal",
            ));
            slots.insert(i + 1, Slot::new(slot_ids::MAIN_PREFIX, mid, MAIN_LABEL, SlotRole::Main));
        }
        slots
    }

    /// Remove free main slots while above the goal, never anchors
    fn trim_to_goal(&self, mut slots: Vec<Slot>, journal: &mut Journal) -> Vec<Slot> {
        for _ in 0..self.max_iterations {
            if slots.len() <= self.goal {
                break;
            }
            let victim = (0..slots.len())
                .filter(|&i| slots[i].role == SlotRole::Main && !slots[i].is_anchor())
                .min_by_key(|&i| {
                    let prev = if i == 0 { self.base.wake } else { slots[i - 1].time };
                    let next = slots.get(i + 1).map_or(self.base.sleep, |s| s.time);
                    (next - prev, i)
                });
            let Some(i) = victim else {
                journal.warn(
                    Warning::new(
                        WarningCode::MealCountAboveGoal,
                        format!(
                            "{} anchored meals exceed the goal of {}",
                            slots.len(),
                            self.goal
                        ),
                    )
                    .with_fix(format!(
                        "raise the meal count to {} or drop a training block",
                        slots.len()
                    )),
                );
                break;
            };
            let removed = slots.remove(i);
            journal.record(ChangeLogEntry::new(
                "scheduler.trim_main",
                json!({ "time": removed.time }),
                json!(null),
                "meal count above goal",
            ));
        }
        slots
    }

    /// Merge slots closer than the merge threshold
    fn merge_close(&self, slots: Vec<Slot>, journal: &mut Journal) -> Vec<Slot> {
        let threshold = minutes(self.config.merge_threshold_min);
        let mut merged: Vec<Slot> = Vec::with_capacity(slots.len());
        for slot in slots {
            match merged.last_mut() {
                Some(last) if slot.time - last.time < threshold => {
                    let combined = merge_pair(last, &slot, journal);
                    *last = combined;
                }
                _ => merged.push(slot),
            }
        }
        merged
    }

    fn nudge_steps(&self) -> Vec<i32> {
        let step = minutes(self.config.nudge_min_step.max(1));
        let max = minutes(self.config.nudge_max_step);
        (1..)
            .map(|k| k * step)
            .take_while(|s| *s <= max)
            .collect()
    }

    fn time_allowed(&self, slot: &Slot, time: i32) -> bool {
        self.base.contains(time)
            && slot.role.earliest().is_none_or(|e| time >= e)
            && slot.role.latest().is_none_or(|l| time <= l)
            && !(slot.role == SlotRole::Main && self.blocked(time))
    }

    fn gap_ok(&self, slots: &[Slot], index: usize, time: i32) -> bool {
        let before = index
            .checked_sub(1)
            .and_then(|i| slots.get(i))
            .is_none_or(|s| time - s.time >= self.min_gap);
        let after = slots
            .get(index + 1)
            .is_none_or(|s| s.time - time >= self.min_gap);
        before && after
    }

    /// Try 15-30 min moves of either slot of a violating pair
    fn try_nudge(&self, slots: &[Slot], pair: usize) -> Option<(usize, i32)> {
        let steps = self.nudge_steps();
        let later = steps.iter().map(|s| (pair + 1, *s));
        let earlier = steps.iter().map(|s| (pair, -*s));
        later.chain(earlier).find_map(|(index, delta)| {
            let slot = &slots[index];
            let time = slot.time + delta;
            (self.time_allowed(slot, time) && self.gap_ok(slots, index, time))
                .then_some((index, time))
        })
    }

    fn violation(&self, slots: &[Slot], accepted: &[(String, String)]) -> Option<usize> {
        slots.windows(2).position(|pair| {
            pair[1].time - pair[0].time < self.min_gap
                && !pair[0].has(SlotTags::MERGED)
                && !pair[1].has(SlotTags::MERGED)
                && !accepted
                    .iter()
                    .any(|(a, b)| *a == pair[0].id && *b == pair[1].id)
        })
    }

    /// Repair min-gap violations: nudge, drop a main, merge anchors, or warn
    fn enforce_min_gap(&self, mut slots: Vec<Slot>, journal: &mut Journal) -> Vec<Slot> {
        let mut accepted: Vec<(String, String)> = Vec::new();
        for _ in 0..self.max_iterations {
            let Some(i) = self.violation(&slots, &accepted) else {
                return slots;
            };
            if self.auto_fix > AutoFixLevel::Off {
                if let Some((index, time)) = self.try_nudge(&slots, i) {
                    journal.record(
                        ChangeLogEntry::new(
                            "scheduler.nudge",
                            json!(slots[index].time),
                            json!(time),
                            "restore minimum gap",
                        )
                        .for_slot(slots[index].id.clone()),
                    );
                    slots[index].time = time;
                    continue;
                }
                let main = [i + 1, i]
                    .into_iter()
                    .find(|&k| slots[k].role == SlotRole::Main && !slots[k].is_anchor());
                if let Some(k) = main {
                    let removed = slots.remove(k);
                    journal.record(ChangeLogEntry::new(
                        "scheduler.drop_main",
                        json!({ "time": removed.time }),
                        json!(null),
                        "restore minimum gap",
                    ));
                    continue;
                }
                if self.auto_fix == AutoFixLevel::Aggressive {
                    let later = slots.remove(i + 1);
                    let combined = merge_pair(&slots[i], &later, journal);
                    slots[i] = combined;
                    continue;
                }
            }
            let (a, b) = (&slots[i], &slots[i + 1]);
            journal.warn(
                Warning::new(
                    WarningCode::MinGapViolation,
                    format!(
                        "{} ({}) and {} ({}) are {} min apart, below the {} min minimum",
                        a.id,
                        self.base.label(a.time),
                        b.id,
                        self.base.label(b.time),
                        b.time - a.time,
                        self.min_gap
                    ),
                )
                .with_fix("lower the minimum gap or move the training block"),
            );
            accepted.push((a.id.clone(), b.id.clone()));
        }
        if self.violation(&slots, &accepted).is_some() {
            journal.warn(Warning::new(
                WarningCode::MinGapViolation,
                "minimum-gap repair stopped at its iteration cap",
            ));
        }
        slots
    }

    fn report_anchor_timing(&self, slots: &[Slot], journal: &mut Journal) {
        let breakfast = slots.iter().find(|s| s.has(SlotTags::WAKE));
        for pre in slots.iter().filter(|s| s.has(SlotTags::PRE)) {
            let Some(breakfast) = breakfast else {
                break;
            };
            if pre.time - breakfast.time < self.min_gap {
                journal.warn(
                    Warning::new(
                        WarningCode::PreWorkoutNearBreakfast,
                        format!(
                            "pre-workout meal at {} is within {} min of breakfast at {}",
                            self.base.label(pre.time),
                            self.min_gap,
                            self.base.label(breakfast.time)
                        ),
                    )
                    .with_fix("train later or skip the separate pre-workout meal"),
                );
            }
        }
        let late = minutes(self.config.post_workout_late_min);
        for slot in slots {
            let SlotRole::Post { block, .. } = slot.role else {
                continue;
            };
            let Some(block) = self.blocks.get(block) else {
                continue;
            };
            if slot.time - block.end > late {
                journal.warn(Warning::new(
                    WarningCode::PostWorkoutLate,
                    format!(
                        "post-workout meal at {} is {} min after training ends",
                        self.base.label(slot.time),
                        slot.time - block.end
                    ),
                ));
            }
        }
    }
}

fn drop_anchor(journal: &mut Journal, id: &str, reason: &str) {
    journal.warn(Warning::new(
        WarningCode::AnchorDropped,
        format!("anchor {id} dropped: {reason}"),
    ));
}

/// Merge two slots: midpoint time, union of tags, the higher-priority role and id survive
fn merge_pair(first: &Slot, second: &Slot, journal: &mut Journal) -> Slot {
    let (keep, other) = if second.role.priority() > first.role.priority() {
        (second, first)
    } else {
        (first, second)
    };
    let mut time = first.time + (second.time - first.time) / 2;
    if let Some(latest) = keep.role.latest() {
        time = time.min(latest);
    }
    if let Some(earliest) = keep.role.earliest() {
        time = time.max(earliest);
    }
    let mut merged = keep.clone();
    merged.time = time;
    merged.tags = first.tags | second.tags | SlotTags::MERGED;
    merged.label = format!("{} + {}", first.label, second.label);
    journal.record(
        ChangeLogEntry::new(
            "scheduler.merge",
            json!([
                { "id": first.id, "time": first.time },
                { "id": second.id, "time": second.time }
            ]),
            json!({ "id": merged.id, "time": time }),
            format!("slots closer than the merge threshold; {} absorbed", other.id),
        )
        .for_slot(merged.id.clone()),
    );
    merged
}

/// Number main slots in time order and attach per-slot attributes
fn finalize(slots: Vec<Slot>, inputs: &PlanInputs) -> Vec<Slot> {
    let mut main_number = 0;
    slots
        .into_iter()
        .map(|mut slot| {
            if slot.role == SlotRole::Main {
                main_number += 1;
                slot.id = format!("{}-{main_number}", slot_ids::MAIN_PREFIX);
                if slot.label == MAIN_LABEL {
                    slot.label = format!("{MAIN_LABEL} {main_number}");
                }
            }
            if let Some(attrs) = inputs.slot_attributes.get(&slot.id) {
                slot.no_lactose = attrs.no_lactose;
                slot.macro_type = attrs.macro_type;
                slot.explicit_zero = attrs.explicit_zero;
                let limits = attrs.limits;
                let has_limits = [limits.protein, limits.carbs, limits.fat]
                    .iter()
                    .any(|l: &UserLimit| !l.is_empty());
                slot.limits = has_limits.then_some(limits);
            }
            slot
        })
        .collect()
}
