//! Request authentication pipeline.
//!
//! Order is a safety invariant: the ban check runs strictly before any
//! credential verification, so a banned identifier never gets
//! attempt-counting benefit (or cryptographic work) from further tries.

use std::sync::Arc;

use serde_json::json;

use credhub_core::audit::{AuditLog, RequestOrigin};
use credhub_core::error::AppError;
use credhub_core::result::AppResult;

use crate::abuse::AbuseTracker;
use crate::bearer;
use crate::jwt::{Claims, TokenVerifier};

/// Composes the abuse gate with bearer extraction and verification.
#[derive(Clone)]
pub struct AuthGate {
    tracker: Arc<AbuseTracker>,
    verifier: Arc<TokenVerifier>,
    audit: Arc<AuditLog>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate").finish()
    }
}

impl AuthGate {
    /// Creates a new gate.
    pub fn new(
        tracker: Arc<AbuseTracker>,
        verifier: Arc<TokenVerifier>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            tracker,
            verifier,
            audit,
        }
    }

    /// Authenticates one request attempt.
    ///
    /// 1. Banned identifiers are rejected before any credential work.
    /// 2. A missing or malformed header is rejected before any
    ///    cryptographic work, without counting as a failed attempt.
    /// 3. Verification failures count toward the identifier's ban
    ///    escalation; success resets its attempt record.
    pub async fn authenticate(
        &self,
        header: Option<&str>,
        identifier: &str,
        origin: &RequestOrigin,
    ) -> AppResult<Claims> {
        if self.tracker.is_banned(identifier).await {
            self.audit.suspicious_activity(
                "banned_identifier_attempt",
                identifier,
                json!({ "endpoint": origin.endpoint }),
            );
            return Err(AppError::banned("Access denied"));
        }

        let token = bearer::extract(header)?;

        match self.verifier.verify(token, origin) {
            Ok(claims) => {
                self.tracker.record_success(identifier).await;
                Ok(claims)
            }
            Err(err) => {
                self.tracker.record_failure(identifier).await;
                Err(err)
            }
        }
    }
}
