//! External ledger gateway boundary.
//!
//! The ledger is the authoritative, append-mostly store of subject
//! verification and expiry status. The core reaches it only through
//! request/response calls with no latency bound beyond the caller's own
//! timeout; status is always re-derived from the ledger, never cached
//! beyond one scheduler interval.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Authoritative status of a subject as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStatus {
    /// Whether an authority has verified the subject.
    pub verified: bool,
    /// Expiry timestamp in seconds since epoch; 0 when none is set.
    pub expires_at: u64,
    /// Whether the subject is currently active.
    pub active: bool,
}

impl SubjectStatus {
    /// Whether the subject is due for an expire transition at `now`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.verified && self.expires_at > 0 && now >= self.expires_at && self.active
    }
}

/// Receipt for a mutating ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Hash identifying the committed transaction.
    pub transaction_hash: String,
}

/// Request/response access to the external ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Queries the authoritative status of a subject.
    async fn subject_status(&self, subject_id: &str) -> AppResult<SubjectStatus>;

    /// Performs the mutating, fee-bearing expire transition for a subject.
    async fn expire_subject(&self, subject_id: &str) -> AppResult<TxReceipt>;
}
