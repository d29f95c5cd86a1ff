//! Failed-attempt tracking and ban escalation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use credhub_core::audit::AuditLog;
use credhub_core::config::AbuseConfig;

use super::store::{AbuseStore, AttemptRecord, BanRecord, BanReason};

/// Aggregate tracker counts for operational monitoring.
///
/// Deliberately carries no raw identifiers: counts are all the security
/// status endpoint needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbuseStats {
    /// Currently active temporary bans.
    pub active_temporary_bans: usize,
    /// Currently active permanent bans.
    pub active_permanent_bans: usize,
    /// Identifiers with at least one failure inside the window.
    pub tracked_identifiers: usize,
}

/// Result of a background sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Attempt records removed because the window emptied them.
    pub removed_attempts: usize,
    /// Expired temporary bans removed.
    pub removed_bans: usize,
}

/// Tracks failed authentication attempts per identifier and escalates to
/// temporary or permanent denial.
///
/// All mutating operations serialize on one coarse lock so that
/// concurrent failures for the same identifier can never let more than
/// `max_attempts` slip past un-ban-checked.
#[derive(Clone)]
pub struct AbuseTracker {
    store: Arc<dyn AbuseStore>,
    audit: Arc<AuditLog>,
    config: AbuseConfig,
    op_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for AbuseTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseTracker")
            .field("config", &self.config)
            .finish()
    }
}

impl AbuseTracker {
    /// Creates a tracker over the given store.
    pub fn new(store: Arc<dyn AbuseStore>, audit: Arc<AuditLog>, config: AbuseConfig) -> Self {
        Self {
            store,
            audit,
            config,
            op_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Records a failed attempt and returns whether this call installed
    /// (or refreshed) a ban.
    ///
    /// The ban is permanent once lifetime failures reach the permanent
    /// threshold, temporary otherwise.
    pub async fn record_failure(&self, identifier: &str) -> bool {
        let _guard = self.op_lock.lock().await;
        let now = Instant::now();

        let mut record = self.store.attempts(identifier).await.unwrap_or_default();
        record.attempts.push(now);
        record.lifetime_failures += 1;
        record.prune(now, self.config.attempt_window());

        let recent = record.attempts.len() as u32;
        let lifetime = record.lifetime_failures;
        self.store.put_attempts(identifier, record).await;

        if recent < self.config.max_attempts {
            return false;
        }

        let permanent = lifetime >= self.config.permanent_ban_threshold;
        let ban = BanRecord {
            banned_at: now,
            duration: (!permanent).then(|| self.config.ban_duration()),
            reason: if permanent {
                BanReason::Permanent
            } else {
                BanReason::Temporary
            },
            attempt_count: lifetime,
        };

        warn!(
            identifier = %identifier,
            lifetime_failures = lifetime,
            ban_type = %ban.reason,
            "Installing ban after repeated failures"
        );

        self.audit.suspicious_activity(
            "identifier_banned",
            identifier,
            json!({
                "attemptCount": lifetime,
                "banType": ban.reason.to_string(),
                "banDurationMinutes": ban.duration.map(|d| d.as_secs() / 60),
            }),
        );

        self.store.put_ban(identifier, ban).await;
        true
    }

    /// Clears the identifier's attempt record after a successful check.
    ///
    /// Never clears a ban: a successful credential check must not be
    /// reachable while banned.
    pub async fn record_success(&self, identifier: &str) {
        let _guard = self.op_lock.lock().await;
        self.store.remove_attempts(identifier).await;
        self.audit
            .auth_success(identifier, json!({ "action": "attempts_reset" }));
    }

    /// Whether the identifier is under an active ban.
    ///
    /// Lazily deletes an expired temporary ban it observes.
    pub async fn is_banned(&self, identifier: &str) -> bool {
        let _guard = self.op_lock.lock().await;
        let now = Instant::now();

        match self.store.ban(identifier).await {
            None => false,
            Some(ban) if ban.is_expired(now) => {
                self.store.remove_ban(identifier).await;
                self.audit
                    .log(
                        credhub_core::AuditLevel::Info,
                        "BAN_EXPIRED",
                        json!({ "identifier": identifier }),
                    );
                false
            }
            Some(_) => true,
        }
    }

    /// Attempts left before a ban, without mutating any record.
    pub async fn remaining_attempts(&self, identifier: &str) -> u32 {
        let now = Instant::now();
        let recent = match self.store.attempts(identifier).await {
            Some(record) => record.recent_count(now, self.config.attempt_window()),
            None => 0,
        };
        self.config.max_attempts.saturating_sub(recent)
    }

    /// Administrative override removing both ban and attempt records.
    ///
    /// Returns whether anything was removed.
    pub async fn unban(&self, identifier: &str) -> bool {
        let _guard = self.op_lock.lock().await;
        let removed_ban = self.store.remove_ban(identifier).await;
        let removed_attempts = self.store.remove_attempts(identifier).await;
        let removed = removed_ban || removed_attempts;

        if removed {
            info!(identifier = %identifier, "Identifier unbanned by administrator");
            self.audit
                .auth_success(identifier, json!({ "action": "manual_unban" }));
        }

        removed
    }

    /// Aggregate counts for the security status endpoint.
    pub async fn stats(&self) -> AbuseStats {
        let now = Instant::now();
        let window = self.config.attempt_window();

        let mut temporary = 0;
        let mut permanent = 0;
        for identifier in self.store.banned_identifiers().await {
            if let Some(ban) = self.store.ban(&identifier).await {
                if ban.is_expired(now) {
                    continue;
                }
                match ban.reason {
                    BanReason::Temporary => temporary += 1,
                    BanReason::Permanent => permanent += 1,
                }
            }
        }

        let mut tracked = 0;
        for identifier in self.store.attempt_identifiers().await {
            if let Some(record) = self.store.attempts(&identifier).await {
                if record.recent_count(now, window) > 0 {
                    tracked += 1;
                }
            }
        }

        AbuseStats {
            active_temporary_bans: temporary,
            active_permanent_bans: permanent,
            tracked_identifiers: tracked,
        }
    }

    /// Prunes attempt records with no recent entries and expired
    /// temporary bans.
    ///
    /// Keeps memory bounded under continuous, never-retried failures from
    /// many distinct identifiers; runs on the same lock as request
    /// handlers.
    pub async fn sweep(&self) -> SweepResult {
        let _guard = self.op_lock.lock().await;
        let now = Instant::now();
        let window = self.config.attempt_window();
        let mut result = SweepResult::default();

        for identifier in self.store.attempt_identifiers().await {
            if let Some(mut record) = self.store.attempts(&identifier).await {
                record.prune(now, window);
                if record.attempts.is_empty() {
                    self.store.remove_attempts(&identifier).await;
                    result.removed_attempts += 1;
                } else {
                    self.store.put_attempts(&identifier, record).await;
                }
            }
        }

        for identifier in self.store.banned_identifiers().await {
            if let Some(ban) = self.store.ban(&identifier).await {
                if ban.is_expired(now) {
                    self.store.remove_ban(&identifier).await;
                    result.removed_bans += 1;
                }
            }
        }

        info!(
            removed_attempts = result.removed_attempts,
            removed_bans = result.removed_bans,
            "Abuse tracker sweep complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abuse::memory::MemoryAbuseStore;
    use tokio::time::{Duration, advance};

    fn tracker() -> (AbuseTracker, Arc<credhub_core::audit::MemorySink>) {
        let (audit, sink) = AuditLog::in_memory();
        (
            AbuseTracker::new(
                Arc::new(MemoryAbuseStore::new()),
                Arc::new(audit),
                AbuseConfig::default(),
            ),
            sink,
        )
    }

    const ID: &str = "203.0.113.5";

    #[tokio::test(start_paused = true)]
    async fn bans_at_exactly_max_attempts() {
        let (tracker, _) = tracker();

        for i in 0..4 {
            assert!(!tracker.record_failure(ID).await, "attempt {i}");
            assert!(!tracker.is_banned(ID).await);
        }

        assert!(tracker.record_failure(ID).await);
        assert!(tracker.is_banned(ID).await);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_outside_window_do_not_count() {
        let (tracker, _) = tracker();

        for _ in 0..4 {
            tracker.record_failure(ID).await;
        }
        // Age the four failures out of the 15-minute window.
        advance(Duration::from_secs(16 * 60)).await;

        assert!(!tracker.record_failure(ID).await);
        assert!(!tracker.is_banned(ID).await);
        assert_eq!(tracker.remaining_attempts(ID).await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn temporary_ban_lifts_at_duration_boundary() {
        let (tracker, sink) = tracker();

        for _ in 0..5 {
            tracker.record_failure(ID).await;
        }
        assert!(tracker.is_banned(ID).await);

        advance(Duration::from_secs(3600)).await;
        assert!(tracker.is_banned(ID).await, "not before the boundary");

        advance(Duration::from_millis(1)).await;
        assert!(!tracker.is_banned(ID).await, "lifted past the boundary");
        assert_eq!(sink.events_of_kind("BAN_EXPIRED").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lifetime_threshold_makes_ban_permanent() {
        let (tracker, _) = tracker();

        // 20 lifetime failures, re-banning along the way.
        for _ in 0..20 {
            tracker.record_failure(ID).await;
        }
        assert!(tracker.is_banned(ID).await);

        advance(Duration::from_secs(10 * 365 * 24 * 3600)).await;
        assert!(tracker.is_banned(ID).await, "permanent bans ignore time");
    }

    #[tokio::test(start_paused = true)]
    async fn lifetime_counter_survives_window_pruning() {
        let (tracker, _) = tracker();

        // 5 failures per window across 3 windows: 15 lifetime.
        for _ in 0..3 {
            for _ in 0..5 {
                tracker.record_failure(ID).await;
            }
            advance(Duration::from_secs(2 * 3600 + 60)).await;
            assert!(!tracker.is_banned(ID).await);
        }

        for _ in 0..5 {
            tracker.record_failure(ID).await;
        }
        assert!(tracker.is_banned(ID).await);

        advance(Duration::from_secs(10 * 365 * 24 * 3600)).await;
        assert!(tracker.is_banned(ID).await);
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_attempts_but_not_ban() {
        let (tracker, _) = tracker();

        for _ in 0..3 {
            tracker.record_failure(ID).await;
        }
        tracker.record_success(ID).await;
        assert_eq!(tracker.remaining_attempts(ID).await, 5);

        for _ in 0..5 {
            tracker.record_failure(ID).await;
        }
        tracker.record_success(ID).await;
        assert!(tracker.is_banned(ID).await, "success must not lift a ban");
    }

    #[tokio::test(start_paused = true)]
    async fn unban_removes_everything() {
        let (tracker, _) = tracker();

        for _ in 0..5 {
            tracker.record_failure(ID).await;
        }
        assert!(tracker.unban(ID).await);
        assert!(!tracker.is_banned(ID).await);
        assert_eq!(tracker.remaining_attempts(ID).await, 5);
        assert!(!tracker.unban(ID).await, "second unban removes nothing");
    }

    #[tokio::test(start_paused = true)]
    async fn ban_installation_is_alerted() {
        let (tracker, sink) = tracker();

        for _ in 0..5 {
            tracker.record_failure(ID).await;
        }

        let alerts = sink.events_of_kind("SUSPICIOUS_ACTIVITY");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].detail["kind"], "identifier_banned");
        assert_eq!(alerts[0].detail["banType"], "temporary");
    }

    #[tokio::test(start_paused = true)]
    async fn stats_count_without_leaking_identifiers() {
        let (tracker, _) = tracker();

        tracker.record_failure("198.51.100.1").await;
        for _ in 0..5 {
            tracker.record_failure("198.51.100.2").await;
        }

        let stats = tracker.stats().await;
        assert_eq!(stats.active_temporary_bans, 1);
        assert_eq!(stats.active_permanent_bans, 0);
        assert_eq!(stats.tracked_identifiers, 2);

        let encoded = serde_json::to_string(&stats).unwrap();
        assert!(!encoded.contains("198.51.100"));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_prunes_stale_state() {
        let (tracker, _) = tracker();

        tracker.record_failure("198.51.100.1").await;
        for _ in 0..5 {
            tracker.record_failure("198.51.100.2").await;
        }

        // Past the window and the temporary ban duration.
        advance(Duration::from_secs(2 * 3600)).await;

        let result = tracker.sweep().await;
        assert_eq!(result.removed_attempts, 2);
        assert_eq!(result.removed_bans, 1);

        let stats = tracker.stats().await;
        assert_eq!(stats.tracked_identifiers, 0);
        assert_eq!(stats.active_temporary_bans, 0);
    }
}
