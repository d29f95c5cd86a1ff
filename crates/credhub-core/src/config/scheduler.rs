//! Identity lifecycle scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Background reconciliation scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scheduler starts with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between reconciliation passes.
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
}

impl SchedulerConfig {
    /// Reconciliation interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_minutes: default_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}
