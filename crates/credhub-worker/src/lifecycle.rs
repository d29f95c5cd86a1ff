//! Identity lifecycle scheduler.
//!
//! Reconciles a locally tracked set of subject identifiers against the
//! ledger's authoritative status on a fixed interval. Membership, not
//! status, is cached locally: status is re-derived from the ledger on
//! every pass, so local belief can never drift more than one interval
//! from ground truth.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use credhub_core::audit::AuditLog;
use credhub_core::config::SchedulerConfig;
use credhub_core::result::AppResult;
use credhub_core::task::PeriodicTask;
use credhub_core::traits::{LedgerGateway, TxReceipt};

/// Read-only scheduler introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    /// Whether the periodic pass is running.
    pub running: bool,
    /// Minutes between passes.
    pub interval_minutes: u64,
    /// Number of subjects currently tracked.
    pub tracked_count: usize,
    /// Tracked subject identifiers.
    pub tracked_ids: Vec<String>,
}

/// Periodically re-derives subject status from the ledger and writes back
/// expiry transitions.
pub struct LifecycleScheduler {
    ledger: Arc<dyn LedgerGateway>,
    audit: Arc<AuditLog>,
    config: SchedulerConfig,
    tracked: Arc<Mutex<HashSet<String>>>,
    task: Mutex<Option<PeriodicTask>>,
}

impl std::fmt::Debug for LifecycleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl LifecycleScheduler {
    /// Creates a scheduler over the given ledger gateway.
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        audit: Arc<AuditLog>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            ledger,
            audit,
            config,
            tracked: Arc::new(Mutex::new(HashSet::new())),
            task: Mutex::new(None),
        }
    }

    /// Starts the periodic reconciliation.
    ///
    /// Idempotent: calling while already running is a no-op with a
    /// warning. Runs one pass immediately, then on the configured
    /// interval; passes never overlap.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            warn!("Lifecycle scheduler is already running");
            return;
        }

        info!(
            interval_minutes = self.config.interval_minutes,
            "Starting lifecycle scheduler"
        );

        let scheduler = Arc::clone(self);
        *task = Some(PeriodicTask::spawn(
            "lifecycle-reconciliation",
            self.config.interval(),
            move || {
                let scheduler = Arc::clone(&scheduler);
                async move {
                    scheduler.run_pass().await;
                }
            },
        ));
    }

    /// Stops the periodic reconciliation.
    ///
    /// No further pass starts after this returns; a pass already in
    /// progress runs to completion. Idempotent.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        match task.take() {
            Some(task) => {
                task.cancel();
                info!("Lifecycle scheduler stopped");
            }
            None => debug!("Lifecycle scheduler was not running"),
        }
    }

    /// Adds a subject to the tracked set.
    pub async fn track(&self, subject_id: &str) {
        let mut tracked = self.tracked.lock().await;
        tracked.insert(subject_id.to_string());
        info!(
            tracked = tracked.len(),
            "Now tracking subjects for expiration"
        );
    }

    /// Runs one reconciliation pass over a snapshot of the tracked set.
    ///
    /// Per-subject ledger errors are logged and never abort the pass: one
    /// unreachable subject must not block reconciliation of the rest. A
    /// subject is removed from tracking only after its expire transition
    /// commits.
    pub async fn run_pass(&self) {
        let subjects: Vec<String> = {
            let tracked = self.tracked.lock().await;
            tracked.iter().cloned().collect()
        };

        if subjects.is_empty() {
            debug!("No subjects tracked for expiration");
            return;
        }

        info!(count = subjects.len(), "Checking subjects for expiration");

        let now = Utc::now().timestamp().max(0) as u64;
        let mut expired = 0u32;

        for subject_id in subjects {
            let status = match self.ledger.subject_status(&subject_id).await {
                Ok(status) => status,
                Err(e) => {
                    error!(
                        subject = %subject_id,
                        error = %e,
                        "Ledger status query failed; subject remains tracked"
                    );
                    continue;
                }
            };

            if !status.is_expired_at(now) {
                continue;
            }

            match self.expire(&subject_id).await {
                Ok(_) => expired += 1,
                Err(e) => {
                    error!(
                        subject = %subject_id,
                        error = %e,
                        "Expire transition failed; subject remains tracked"
                    );
                }
            }
        }

        info!(expired, "Reconciliation pass complete");
    }

    /// Manually triggers the expire transition for one subject,
    /// independent of the scheduled pass.
    ///
    /// Unlike the batch pass, ledger errors propagate to the caller: a
    /// manual call has an interactive caller who should see the failure.
    pub async fn check_one(&self, subject_id: &str) -> AppResult<TxReceipt> {
        self.expire(subject_id).await
    }

    /// Read-only scheduler state.
    pub async fn status(&self) -> SchedulerStatus {
        let tracked = self.tracked.lock().await;
        let running = self
            .task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_finished());

        let mut tracked_ids: Vec<String> = tracked.iter().cloned().collect();
        tracked_ids.sort();

        SchedulerStatus {
            running,
            interval_minutes: self.config.interval_minutes,
            tracked_count: tracked.len(),
            tracked_ids,
        }
    }

    /// Performs the expire transition and untracks the subject on success.
    async fn expire(&self, subject_id: &str) -> AppResult<TxReceipt> {
        let receipt = self.ledger.expire_subject(subject_id).await?;

        info!(
            subject = %subject_id,
            tx = %receipt.transaction_hash,
            "Subject marked as expired on ledger"
        );
        self.audit
            .ledger_transaction(subject_id, &receipt.transaction_hash);

        self.tracked.lock().await.remove(subject_id);
        Ok(receipt)
    }
}
