use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_MUTATION_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_millis(50);

/// Quiet periods before a rescan, per trigger kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceDelays {
    pub mutation: Duration,
    pub navigation: Duration,
}

impl Default for DebounceDelays {
    fn default() -> Self {
        Self {
            mutation: DEFAULT_MUTATION_DELAY,
            navigation: DEFAULT_NAVIGATION_DELAY,
        }
    }
}

/// Trailing-edge debounce: each trigger replaces the pending deadline.
#[derive(Debug, Default)]
pub struct Debouncer {
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer, superseding any pending deadline.
    pub fn trigger(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
