//! Deadlines polled by the search loops.
//!
//! Every strategy checks [`Deadline::time_out`] at the top of its main loop
//! and stops there; a state already taken off the frontier is always
//! finished first.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A polled time budget.
pub trait Deadline {
    /// Whether the budget has been used up.
    fn time_out(&self) -> bool;

    /// Wall-clock time since the run started.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock budget measured from construction.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tsp_anytime::timer::{Deadline, Timer};
///
/// let timer = Timer::new(Duration::from_secs(60));
/// assert!(!timer.time_out());
/// assert!(!Timer::unbounded().time_out());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
    limit: Option<Duration>,
}

impl Timer {
    /// Starts a timer that expires after `limit`.
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: Some(limit),
        }
    }

    /// Starts a timer that never expires.
    pub fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            limit: None,
        }
    }

    /// Starts a timer from an optional limit in milliseconds.
    pub fn from_millis(limit_ms: Option<u64>) -> Self {
        match limit_ms {
            Some(ms) => Self::new(Duration::from_millis(ms)),
            None => Self::unbounded(),
        }
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

impl Deadline for Timer {
    fn time_out(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Budget counted in polls rather than time.
///
/// Reports a time-out once `time_out` has been called `polls` times, which
/// makes truncated runs reproducible regardless of machine speed.
#[derive(Debug)]
pub struct StepBudget {
    start: Instant,
    remaining: Cell<usize>,
}

impl StepBudget {
    pub fn new(polls: usize) -> Self {
        Self {
            start: Instant::now(),
            remaining: Cell::new(polls),
        }
    }

    /// Polls left before the budget reports a time-out.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for StepBudget {
    fn time_out(&self) -> bool {
        match self.remaining.get() {
            0 => true,
            n => {
                self.remaining.set(n - 1);
                false
            }
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
