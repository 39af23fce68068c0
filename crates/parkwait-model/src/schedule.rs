use chrono::{Days, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid active window {start}:00-{end}:00 (need start < end <= 24)")]
    InvalidWindow { start: u32, end: u32 },

    #[error("poll interval must be at least one minute")]
    InvalidInterval,

    #[error("cannot compute next window start from {0}")]
    TimeArithmetic(NaiveDateTime),
}

/// Hours of the day, `[start_hour, end_hour)`, during which polling is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    start_hour: u32,
    end_hour: u32,
}

impl ScheduleWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, ScheduleError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ScheduleError::InvalidWindow {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn contains(&self, now: &NaiveDateTime) -> bool {
        (self.start_hour..self.end_hour).contains(&now.hour())
    }
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 21,
        }
    }
}

/// What the poll loop should do at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Inside the window: scrape now, then sleep `interval` before asking again.
    Active { interval: Duration },
    /// Outside the window: sleep `wait`, which ends exactly at `wake_at`.
    Dormant { wait: Duration, wake_at: NaiveDateTime },
}

/// Day/night duty cycle over a [`ScheduleWindow`].
///
/// A pure function of wall-clock time and configuration; nothing is carried
/// between calls or across restarts.
#[derive(Debug, Clone, Copy)]
pub struct DutyCycleScheduler {
    window: ScheduleWindow,
    interval: Duration,
}

impl DutyCycleScheduler {
    pub fn new(window: ScheduleWindow, interval_minutes: u64) -> Result<Self, ScheduleError> {
        if interval_minutes == 0 {
            return Err(ScheduleError::InvalidInterval);
        }
        Ok(Self {
            window,
            interval: Duration::from_secs(interval_minutes * 60),
        })
    }

    pub fn window(&self) -> ScheduleWindow {
        self.window
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_action(&self, now: NaiveDateTime) -> Result<NextAction, ScheduleError> {
        if self.window.contains(&now) {
            return Ok(NextAction::Active {
                interval: self.interval,
            });
        }

        let mut wake_at = now
            .date()
            .and_hms_opt(self.window.start_hour, 0, 0)
            .ok_or(ScheduleError::TimeArithmetic(now))?;
        if now.hour() >= self.window.end_hour {
            wake_at = wake_at
                .checked_add_days(Days::new(1))
                .ok_or(ScheduleError::TimeArithmetic(now))?;
        }

        let wait = (wake_at - now)
            .to_std()
            .map_err(|_| ScheduleError::TimeArithmetic(now))?;
        if wait.is_zero() {
            return Err(ScheduleError::TimeArithmetic(now));
        }

        Ok(NextAction::Dormant { wait, wake_at })
    }
}
