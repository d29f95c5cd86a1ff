//! Role-based authorization over verified claims.

use std::sync::Arc;

use serde_json::json;

use credhub_core::audit::{AuditLog, RequestOrigin};
use credhub_core::error::AppError;
use credhub_core::result::AppResult;

use crate::jwt::{Claims, Role};

/// Authorization gate over a verified claim and a set of allowed roles.
///
/// An attempted privilege escalation is flagged at ALERT severity, above a
/// plain authentication failure.
#[derive(Clone)]
pub struct RoleGate {
    /// Audit log for escalation attempts.
    audit: Arc<AuditLog>,
}

impl std::fmt::Debug for RoleGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleGate").finish()
    }
}

impl RoleGate {
    /// Creates a new role gate.
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }

    /// Denies unless the claim's role is a member of `allowed`.
    pub fn require(
        &self,
        claims: &Claims,
        allowed: &[Role],
        origin: &RequestOrigin,
    ) -> AppResult<()> {
        if allowed.contains(&claims.role) {
            return Ok(());
        }

        self.audit.suspicious_activity(
            "role_escalation_attempt",
            &origin.ip,
            json!({
                "subjectId": claims.sub,
                "role": claims.role.to_string(),
                "requiredRoles": allowed.iter().map(Role::to_string).collect::<Vec<_>>(),
                "endpoint": origin.endpoint,
            }),
        );

        Err(AppError::insufficient_permissions(format!(
            "Required role: {}",
            allowed
                .iter()
                .map(Role::to_string)
                .collect::<Vec<_>>()
                .join(" or ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credhub_core::{AuditLevel, ErrorKind};

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "SUBJ123".to_string(),
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn origin() -> RequestOrigin {
        RequestOrigin::new("203.0.113.5", "/api/admin")
    }

    #[test]
    fn allows_member_role() {
        let (audit, _) = AuditLog::in_memory();
        let gate = RoleGate::new(Arc::new(audit));
        assert!(
            gate.require(&claims(Role::Authority), &[Role::Authority], &origin())
                .is_ok()
        );
    }

    #[test]
    fn denies_and_alerts_on_escalation_attempt() {
        let (audit, sink) = AuditLog::in_memory();
        let gate = RoleGate::new(Arc::new(audit));

        let err = gate
            .require(&claims(Role::Subject), &[Role::Authority], &origin())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsufficientPermissions);

        let events = sink.events_of_kind("SUSPICIOUS_ACTIVITY");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, AuditLevel::Alert);
        assert_eq!(events[0].detail["kind"], "role_escalation_attempt");
    }
}
