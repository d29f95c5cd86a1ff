//! In-memory ledger gateway test double.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use credhub_core::error::AppError;
use credhub_core::result::AppResult;
use credhub_core::traits::{LedgerGateway, SubjectStatus, TxReceipt};

/// Scripted ledger gateway that records every call.
#[derive(Debug, Default)]
pub struct MockLedgerGateway {
    statuses: Mutex<HashMap<String, SubjectStatus>>,
    unreachable: Mutex<HashSet<String>>,
    expire_failures: Mutex<HashSet<String>>,
    status_calls: Mutex<HashMap<String, u32>>,
    expire_calls: Mutex<HashMap<String, u32>>,
}

impl MockLedgerGateway {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the status returned for a subject.
    pub fn set_status(&self, subject_id: &str, status: SubjectStatus) {
        self.statuses
            .lock()
            .expect("mock lock poisoned")
            .insert(subject_id.to_string(), status);
    }

    /// Makes status queries for a subject time out (`LedgerUnreachable`).
    pub fn set_unreachable(&self, subject_id: &str) {
        self.unreachable
            .lock()
            .expect("mock lock poisoned")
            .insert(subject_id.to_string());
    }

    /// Makes expire transitions fail for a subject (`LedgerError`).
    pub fn fail_expire(&self, subject_id: &str) {
        self.expire_failures
            .lock()
            .expect("mock lock poisoned")
            .insert(subject_id.to_string());
    }

    /// Number of status queries seen for a subject.
    pub fn status_calls(&self, subject_id: &str) -> u32 {
        *self
            .status_calls
            .lock()
            .expect("mock lock poisoned")
            .get(subject_id)
            .unwrap_or(&0)
    }

    /// Number of expire transitions seen for a subject.
    pub fn expire_calls(&self, subject_id: &str) -> u32 {
        *self
            .expire_calls
            .lock()
            .expect("mock lock poisoned")
            .get(subject_id)
            .unwrap_or(&0)
    }
}

#[async_trait]
impl LedgerGateway for MockLedgerGateway {
    async fn subject_status(&self, subject_id: &str) -> AppResult<SubjectStatus> {
        *self
            .status_calls
            .lock()
            .expect("mock lock poisoned")
            .entry(subject_id.to_string())
            .or_insert(0) += 1;

        if self
            .unreachable
            .lock()
            .expect("mock lock poisoned")
            .contains(subject_id)
        {
            return Err(AppError::ledger_unreachable("Ledger query timed out"));
        }

        self.statuses
            .lock()
            .expect("mock lock poisoned")
            .get(subject_id)
            .copied()
            .ok_or_else(|| AppError::ledger(format!("Unknown subject: {subject_id}")))
    }

    async fn expire_subject(&self, subject_id: &str) -> AppResult<TxReceipt> {
        *self
            .expire_calls
            .lock()
            .expect("mock lock poisoned")
            .entry(subject_id.to_string())
            .or_insert(0) += 1;

        if self
            .expire_failures
            .lock()
            .expect("mock lock poisoned")
            .contains(subject_id)
        {
            return Err(AppError::ledger("Expire transition reverted"));
        }

        Ok(TxReceipt {
            transaction_hash: format!("0xmock{subject_id}"),
        })
    }
}
