//! Recurring timers owned by the running session.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringTimer {
    interval: TimeDelta,
    next_due: DateTime<Utc>,
}

impl RecurringTimer {
    pub fn start(now: DateTime<Utc>, interval: Duration) -> Self {
        let interval = TimeDelta::from_std(interval)
            .unwrap_or(TimeDelta::seconds(1))
            .max(TimeDelta::seconds(1));
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// True when at least one period elapsed since the last firing.
    /// Missed periods are coalesced into a single firing.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        while self.next_due <= now {
            self.next_due += self.interval;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub history_interval: Duration,
    pub ui_clock_interval: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            history_interval: Duration::from_secs(300),
            ui_clock_interval: Duration::from_secs(1),
        }
    }
}

/// Which timers fired during one [`SessionTimers::poll`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DueTimers {
    pub history: bool,
    pub ui_clock: bool,
}

/// The history sampler and the UI clock. Each slot holds at most one timer;
/// starting a timer replaces the previous instance.
#[derive(Debug, Default)]
pub struct SessionTimers {
    history: Option<RecurringTimer>,
    ui_clock: Option<RecurringTimer>,
}

impl SessionTimers {
    pub fn start_history(&mut self, now: DateTime<Utc>, interval: Duration) {
        self.history = Some(RecurringTimer::start(now, interval));
    }

    pub fn start_ui_clock(&mut self, now: DateTime<Utc>, interval: Duration) {
        self.ui_clock = Some(RecurringTimer::start(now, interval));
    }

    pub fn stop_all(&mut self) {
        self.history = None;
        self.ui_clock = None;
    }

    pub fn history_running(&self) -> bool {
        self.history.is_some()
    }

    pub fn ui_clock_running(&self) -> bool {
        self.ui_clock.is_some()
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> DueTimers {
        DueTimers {
            history: self.history.as_mut().is_some_and(|t| t.poll(now)),
            ui_clock: self.ui_clock.as_mut().is_some_and(|t| t.poll(now)),
        }
    }
}
