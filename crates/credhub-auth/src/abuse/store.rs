//! Storage seam for abuse-tracking state.
//!
//! The tracker's logic is written as pure functions over these records so
//! the same escalation rules can run against an external cache when
//! scaling past one process. Timestamps use `tokio::time::Instant` so
//! tests can drive windows and ban expiry with a paused clock.

use async_trait::async_trait;
use tokio::time::{Duration, Instant};

/// Why an identifier is banned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanReason {
    /// Expires after a fixed duration.
    Temporary,
    /// Never expires implicitly; requires an explicit administrative clear.
    Permanent,
}

impl std::fmt::Display for BanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temporary => write!(f, "temporary"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Per-identifier failed-attempt history.
#[derive(Debug, Clone, Default)]
pub struct AttemptRecord {
    /// Attempt timestamps within the sliding window. Pruned lazily on
    /// access; never contains entries older than `now - window`.
    pub attempts: Vec<Instant>,
    /// Monotonic lifetime failure count; never pruned.
    pub lifetime_failures: u32,
}

impl AttemptRecord {
    /// Drops attempts that have aged out of the window.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        self.attempts
            .retain(|at| now.duration_since(*at) < window);
    }

    /// Attempts still inside the window, without mutating the record.
    pub fn recent_count(&self, now: Instant, window: Duration) -> u32 {
        self.attempts
            .iter()
            .filter(|at| now.duration_since(**at) < window)
            .count() as u32
    }
}

/// Per-identifier ban state.
#[derive(Debug, Clone)]
pub struct BanRecord {
    /// When the ban was installed.
    pub banned_at: Instant,
    /// Finite duration for temporary bans; `None` means unbounded.
    pub duration: Option<Duration>,
    /// Temporary or permanent.
    pub reason: BanReason,
    /// Lifetime failure count at the time of the ban.
    pub attempt_count: u32,
}

impl BanRecord {
    /// A temporary ban is inactive once strictly more than its duration
    /// has elapsed. Permanent bans never expire implicitly.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.duration {
            Some(duration) => now.duration_since(self.banned_at) > duration,
            None => false,
        }
    }
}

/// Get/put/delete access to attempt and ban records.
#[async_trait]
pub trait AbuseStore: Send + Sync {
    /// Fetches the attempt record for an identifier.
    async fn attempts(&self, identifier: &str) -> Option<AttemptRecord>;

    /// Stores the attempt record for an identifier.
    async fn put_attempts(&self, identifier: &str, record: AttemptRecord);

    /// Removes the attempt record; returns whether one existed.
    async fn remove_attempts(&self, identifier: &str) -> bool;

    /// Fetches the ban record for an identifier.
    async fn ban(&self, identifier: &str) -> Option<BanRecord>;

    /// Stores the ban record for an identifier.
    async fn put_ban(&self, identifier: &str, record: BanRecord);

    /// Removes the ban record; returns whether one existed.
    async fn remove_ban(&self, identifier: &str) -> bool;

    /// Identifiers with an attempt record.
    async fn attempt_identifiers(&self) -> Vec<String>;

    /// Identifiers with a ban record.
    async fn banned_identifiers(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn prune_drops_only_aged_attempts() {
        let window = Duration::from_secs(900);
        let mut record = AttemptRecord::default();

        record.attempts.push(Instant::now());
        tokio::time::advance(Duration::from_secs(600)).await;
        record.attempts.push(Instant::now());
        tokio::time::advance(Duration::from_secs(400)).await;

        let now = Instant::now();
        assert_eq!(record.recent_count(now, window), 1);
        record.prune(now, window);
        assert_eq!(record.attempts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn temporary_ban_expires_strictly_after_duration() {
        let ban = BanRecord {
            banned_at: Instant::now(),
            duration: Some(Duration::from_secs(3600)),
            reason: BanReason::Temporary,
            attempt_count: 5,
        };

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(!ban.is_expired(Instant::now()));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(ban.is_expired(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_ban_never_expires() {
        let ban = BanRecord {
            banned_at: Instant::now(),
            duration: None,
            reason: BanReason::Permanent,
            attempt_count: 20,
        };

        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(!ban.is_expired(Instant::now()));
    }
}
