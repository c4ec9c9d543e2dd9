//! Polling configuration for the generation status loop.

use crate::orchestrator::PollSchedule;
use std::time::Duration;

/// Overall deadline after which a run fails with a timeout.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(180);

/// Configuration for status polling.
///
/// The schedule is a fixed, shrinking sequence of waits reused cyclically
/// once exhausted; the deadline bounds the whole polling phase so a job
/// the service never finishes cannot poll forever.
#[derive(Debug, Clone)]
pub struct PollConfig {
    schedule: PollSchedule,
    deadline: Duration,
}

impl PollConfig {
    /// Creates a polling configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backoff schedule.
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the overall polling deadline. Default: 180 seconds.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// The backoff schedule.
    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// The overall polling deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            schedule: PollSchedule::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadline() {
        assert_eq!(PollConfig::default().deadline(), DEFAULT_DEADLINE);
    }

    #[test]
    fn test_with_deadline() {
        let config = PollConfig::new().with_deadline(Duration::from_secs(10));
        assert_eq!(config.deadline(), Duration::from_secs(10));
    }
}
