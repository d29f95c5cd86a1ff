//! Abuse tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Failed-attempt tracking and ban escalation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseConfig {
    /// Failed attempts within the window before a ban is installed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Sliding window in minutes over which failures are counted.
    #[serde(default = "default_attempt_window")]
    pub attempt_window_minutes: u64,
    /// Temporary ban duration in minutes.
    #[serde(default = "default_ban_duration")]
    pub ban_duration_minutes: u64,
    /// Lifetime failure count at which a ban becomes permanent.
    #[serde(default = "default_permanent_threshold")]
    pub permanent_ban_threshold: u32,
    /// Interval in minutes between background sweeps of stale records.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl AbuseConfig {
    /// Sliding attempt window as a duration.
    pub fn attempt_window(&self) -> Duration {
        Duration::from_secs(self.attempt_window_minutes * 60)
    }

    /// Temporary ban duration as a duration.
    pub fn ban_duration(&self) -> Duration {
        Duration::from_secs(self.ban_duration_minutes * 60)
    }

    /// Background sweep interval as a duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes * 60)
    }
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_window_minutes: default_attempt_window(),
            ban_duration_minutes: default_ban_duration(),
            permanent_ban_threshold: default_permanent_threshold(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_attempt_window() -> u64 {
    15
}

fn default_ban_duration() -> u64 {
    60
}

fn default_permanent_threshold() -> u32 {
    20
}

fn default_cleanup_interval() -> u64 {
    60
}
