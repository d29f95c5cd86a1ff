//! Background sweep of stale abuse-tracking state.

use std::sync::Arc;

use credhub_core::task::PeriodicTask;

use super::tracker::AbuseTracker;

/// Drives the tracker's sweep on a fixed interval, independent of any
/// request.
#[derive(Clone)]
pub struct AbuseCleanup {
    tracker: Arc<AbuseTracker>,
}

impl std::fmt::Debug for AbuseCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseCleanup").finish()
    }
}

impl AbuseCleanup {
    /// Creates a cleanup handler over the tracker.
    pub fn new(tracker: Arc<AbuseTracker>) -> Self {
        Self { tracker }
    }

    /// Spawns the periodic sweep using the tracker's configured interval.
    pub fn start(&self, interval: std::time::Duration) -> PeriodicTask {
        let tracker = Arc::clone(&self.tracker);
        PeriodicTask::spawn("abuse-sweep", interval, move || {
            let tracker = Arc::clone(&tracker);
            async move {
                tracker.sweep().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abuse::memory::MemoryAbuseStore;
    use credhub_core::audit::AuditLog;
    use credhub_core::config::AbuseConfig;
    use tokio::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn periodic_sweep_removes_stale_records() {
        let (audit, _) = AuditLog::in_memory();
        let tracker = Arc::new(AbuseTracker::new(
            Arc::new(MemoryAbuseStore::new()),
            Arc::new(audit),
            AbuseConfig::default(),
        ));

        tracker.record_failure("198.51.100.9").await;

        let task = AbuseCleanup::new(Arc::clone(&tracker)).start(Duration::from_secs(3600));

        // Past the attempt window; the next sweep tick should prune.
        tokio::time::sleep(Duration::from_secs(3700)).await;

        let stats = tracker.stats().await;
        assert_eq!(stats.tracked_identifiers, 0);

        task.shutdown().await;
    }
}
