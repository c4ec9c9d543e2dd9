//! Backoff schedule for status polling.

use std::time::Duration;

/// Default schedule: a longer first wait while the job spins up, then
/// faster checks near expected completion.
const DEFAULT_DELAYS_MS: [u64; 4] = [3000, 2000, 1000, 500];

/// A fixed, shrinking sequence of wait durations, reused cyclically once
/// exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    delays: Vec<Duration>,
}

impl PollSchedule {
    /// Creates a schedule from explicit delays.
    ///
    /// An empty sequence falls back to the default schedule.
    pub fn new(delays: Vec<Duration>) -> Self {
        if delays.is_empty() {
            return Self::default();
        }
        Self { delays }
    }

    /// Returns the wait before poll number `attempt` (zero-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        self.delays[attempt % self.delays.len()]
    }

    /// Number of distinct delays before the schedule repeats.
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    /// Always false; a schedule never runs out of delays.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            delays: DEFAULT_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}
