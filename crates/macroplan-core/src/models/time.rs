// ABOUTME: Absolute-minute time base for one planned day
// ABOUTME: Orders sleep past midnight and accounts for UTC-offset changes between wake and sleep
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::clock::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::errors::PlanError;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Calendar anchor for absolute-minute arithmetic
///
/// Offsets are minutes east of UTC. When the sleep offset differs from the
/// wake offset (a DST transition during the day) the window length reflects
/// real elapsed time. The change takes effect at `offset_change_at` local
/// time, or right after wake when unset; every clock time after the change
/// is moved onto the same elapsed-minute axis as sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAnchor {
    /// Local date of the wake time
    pub date: NaiveDate,
    /// UTC offset in effect at wake (defaults to 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_utc_offset_min: Option<i32>,
    /// UTC offset in effect at sleep (defaults to the wake offset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_utc_offset_min: Option<i32>,
    /// Local clock time at which the sleep offset takes over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_change_at: Option<NaiveTime>,
}

impl DayAnchor {
    /// Anchor without offset information
    #[must_use]
    pub const fn on(date: NaiveDate) -> Self {
        Self {
            date,
            wake_utc_offset_min: None,
            sleep_utc_offset_min: None,
            offset_change_at: None,
        }
    }
}

/// Resolved wake/sleep window in absolute minutes from the reference midnight
///
/// The axis counts elapsed minutes. Local clock minutes after `shift_after`
/// sit `shift_min` minutes earlier on the axis than their wall-clock value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBase {
    /// Wake minute
    pub wake: i32,
    /// Sleep minute, always greater than `wake`
    pub sleep: i32,
    /// Sleep offset minus wake offset
    #[serde(default)]
    pub shift_min: i32,
    /// Last axis minute still on the wake offset
    #[serde(default)]
    pub shift_after: i32,
}

fn minute_of_day(time: NaiveTime) -> i32 {
    // hour() < 24 and minute() < 60, so the product always fits
    #[allow(clippy::cast_possible_wrap)]
    {
        (time.hour() * 60 + time.minute()) as i32
    }
}

impl TimeBase {
    /// Resolve wake and sleep into one monotone minute axis
    ///
    /// # Errors
    ///
    /// Returns `PlanError::InvalidInput` if wake equals sleep, if the anchor
    /// date has no successor, or if an offset change collapses the window.
    pub fn resolve(
        wake: NaiveTime,
        sleep: NaiveTime,
        day: Option<&DayAnchor>,
    ) -> Result<Self, PlanError> {
        let wake_clock = minute_of_day(wake);
        let sleep_clock = minute_of_day(sleep);
        if wake_clock == sleep_clock {
            return Err(PlanError::invalid_input(
                "sleep",
                "wake and sleep times must differ",
            ));
        }

        let Some(anchor) = day else {
            let sleep_abs = if sleep_clock <= wake_clock {
                sleep_clock + MINUTES_PER_DAY
            } else {
                sleep_clock
            };
            return Ok(Self::new(wake_clock, sleep_abs));
        };

        let sleep_date = if sleep_clock <= wake_clock {
            anchor
                .date
                .succ_opt()
                .ok_or_else(|| PlanError::invalid_input("day", "date has no successor"))?
        } else {
            anchor.date
        };
        let midnight = anchor
            .date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PlanError::invalid_input("day", "date has no midnight"))?;
        let wake_local = anchor.date.and_time(wake);
        let sleep_local = sleep_date.and_time(sleep);

        let wake_offset = anchor.wake_utc_offset_min.unwrap_or(0);
        let sleep_offset = anchor.sleep_utc_offset_min.unwrap_or(wake_offset);
        let shift = sleep_offset - wake_offset;

        let to_i32 = |value: i64| {
            i32::try_from(value).map_err(|_| PlanError::invalid_input("day", "minute overflow"))
        };
        let wake_abs = to_i32((wake_local - midnight).num_minutes())?;
        let sleep_local_abs = to_i32((sleep_local - midnight).num_minutes())?;
        let mut base = Self::new(wake_abs, sleep_local_abs);
        if shift != 0 {
            base.shift_min = shift;
            base.shift_after = anchor
                .offset_change_at
                .map_or(wake_abs, |change| base.local_minute(change));
            debug!(
                shift_minutes = shift,
                shift_after = base.shift_after,
                "UTC offset changes between wake and sleep"
            );
        }
        base.sleep = base.to_axis(sleep_local_abs);
        if base.sleep <= base.wake {
            return Err(PlanError::invalid_input(
                "day",
                "offset change leaves no time between wake and sleep",
            ));
        }
        Ok(base)
    }

    /// Window without an offset change
    #[must_use]
    pub const fn new(wake: i32, sleep: i32) -> Self {
        Self {
            wake,
            sleep,
            shift_min: 0,
            shift_after: wake,
        }
    }

    /// Local clock minute of `time`, rolling times before wake past midnight
    fn local_minute(&self, time: NaiveTime) -> i32 {
        let clock = minute_of_day(time);
        let wake_clock = self.wake.rem_euclid(MINUTES_PER_DAY);
        let day_start = self.wake - wake_clock;
        if clock < wake_clock {
            day_start + clock + MINUTES_PER_DAY
        } else {
            day_start + clock
        }
    }

    /// Move a local clock minute onto the elapsed-minute axis
    ///
    /// Clock times skipped by a forward change collapse onto the change
    /// itself, so the mapping never runs backwards.
    const fn to_axis(&self, local: i32) -> i32 {
        if self.shift_min == 0 || local <= self.shift_after {
            return local;
        }
        let shifted = local - self.shift_min;
        if shifted < self.shift_after {
            self.shift_after
        } else {
            shifted
        }
    }

    /// Place a clock time on this day's axis, rolling times before wake past midnight
    #[must_use]
    pub fn place(&self, time: NaiveTime) -> i32 {
        self.to_axis(self.local_minute(time))
    }

    /// Minutes to add to an axis minute to read the local wall clock
    #[must_use]
    pub const fn clock_shift(&self, minute: i32) -> i32 {
        if minute > self.shift_after {
            self.shift_min
        } else {
            0
        }
    }

    /// Wall-clock `HH:MM` of an axis minute
    #[must_use]
    pub fn label(&self, minute: i32) -> String {
        clock_label(minute + self.clock_shift(minute))
    }

    /// Length of the waking window in minutes
    #[must_use]
    pub const fn window_len(&self) -> i32 {
        self.sleep - self.wake
    }

    /// Whether a minute lies inside `[wake, sleep]`
    #[must_use]
    pub const fn contains(&self, minute: i32) -> bool {
        minute >= self.wake && minute <= self.sleep
    }
}

/// Render an absolute minute as a wall-clock `HH:MM` label
#[must_use]
pub fn clock_label(minute: i32) -> String {
    let clock = minute.rem_euclid(MINUTES_PER_DAY);
    format!(
        "{:02}:{:02}",
        clock / MINUTES_PER_HOUR,
        clock % MINUTES_PER_HOUR
    )
}
