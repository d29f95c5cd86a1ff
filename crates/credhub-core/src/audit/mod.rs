//! Append-only structured audit log.
//!
//! Every security-relevant operation writes one JSON line per event to an
//! injected [`AuditSink`]. Events are never read back by the core; ops
//! tooling may tail the stream. The log is passed explicitly into each
//! component's constructor so tests can capture events in memory.

mod sink;

pub use sink::{AuditSink, FileSink, MemorySink};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditLevel {
    /// Routine security event.
    #[serde(rename = "INFO")]
    Info,
    /// Authentication failure or other recoverable anomaly.
    #[serde(rename = "WARNING")]
    Warning,
    /// Abuse, escalation attempt, or other event worth paging on.
    #[serde(rename = "ALERT")]
    Alert,
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Wall-clock time the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Event severity.
    pub level: AuditLevel,
    /// Event kind, e.g. `"AUTH_FAILURE"`.
    pub event: String,
    /// Free-form detail mapping.
    #[serde(flatten)]
    pub detail: Value,
}

/// Network origin of a request, recorded for forensic traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOrigin {
    /// Requesting network identifier (typically the client IP).
    pub ip: String,
    /// Endpoint the request targeted.
    pub endpoint: String,
}

impl RequestOrigin {
    /// Creates a new request origin.
    pub fn new(ip: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Structured security audit logger.
///
/// Sink failures are logged through `tracing` and never propagated: a
/// failed audit write must not fail the operation being audited.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish()
    }
}

impl AuditLog {
    /// Creates an audit log writing to the given sink.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Creates an audit log appending JSON lines to a file.
    pub fn to_file(path: &str) -> AppResult<Self> {
        Ok(Self::new(Arc::new(FileSink::open(path)?)))
    }

    /// Creates an audit log capturing events in memory, for tests.
    pub fn in_memory() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Self::new(Arc::clone(&sink) as Arc<dyn AuditSink>), sink)
    }

    /// Records an event at the given level.
    pub fn log(&self, level: AuditLevel, event: &str, detail: Value) {
        let record = AuditEvent {
            timestamp: Utc::now(),
            level,
            event: event.to_string(),
            detail,
        };

        match level {
            AuditLevel::Info => tracing::info!(event = %record.event, "audit"),
            AuditLevel::Warning => tracing::warn!(event = %record.event, "audit"),
            AuditLevel::Alert => tracing::error!(event = %record.event, "audit"),
        }

        if let Err(e) = self.sink.append(&record) {
            tracing::error!(error = %e, event = %record.event, "Failed to write audit event");
        }
    }

    /// Records a successful authentication.
    pub fn auth_success(&self, identifier: &str, detail: Value) {
        self.log(
            AuditLevel::Info,
            "AUTH_SUCCESS",
            with_identifier(identifier, detail),
        );
    }

    /// Records a failed authentication.
    pub fn auth_failure(&self, reason: &str, identifier: &str, detail: Value) {
        let mut detail = with_identifier(identifier, detail);
        if let Value::Object(map) = &mut detail {
            map.insert("reason".to_string(), Value::String(reason.to_string()));
        }
        self.log(AuditLevel::Warning, "AUTH_FAILURE", detail);
    }

    /// Records abuse or an escalation attempt at ALERT severity.
    pub fn suspicious_activity(&self, kind: &str, identifier: &str, detail: Value) {
        let mut detail = with_identifier(identifier, detail);
        if let Value::Object(map) = &mut detail {
            map.insert("kind".to_string(), Value::String(kind.to_string()));
        }
        self.log(AuditLevel::Alert, "SUSPICIOUS_ACTIVITY", detail);
    }

    /// Records a mutating ledger transaction.
    pub fn ledger_transaction(&self, subject_id: &str, tx_hash: &str) {
        self.log(
            AuditLevel::Info,
            "LEDGER_TX",
            serde_json::json!({ "subjectId": subject_id, "txHash": tx_hash }),
        );
    }

    /// Records a system lifecycle event.
    pub fn system_event(&self, event: &str, detail: Value) {
        let mut detail = detail;
        if let Value::Object(map) = &mut detail {
            map.insert("event".to_string(), Value::String(event.to_string()));
        }
        self.log(AuditLevel::Info, "SYSTEM_EVENT", detail);
    }
}

fn with_identifier(identifier: &str, mut detail: Value) -> Value {
    if let Value::Object(map) = &mut detail {
        map.insert(
            "identifier".to_string(),
            Value::String(identifier.to_string()),
        );
    }
    detail
}
