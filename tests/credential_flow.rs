//! End-to-end tests for the credential and lifecycle pipelines.
//!
//! These wire real components together the way the server binary does,
//! substituting in-memory stores and a scripted ledger gateway for the
//! external pieces.

use std::sync::Arc;

use credhub_auth::abuse::{AbuseTracker, MemoryAbuseStore};
use credhub_auth::jwt::{Role, TokenIssuer, TokenVerifier};
use credhub_auth::{AuthGate, RoleGate};
use credhub_core::audit::{AuditLog, MemorySink, RequestOrigin};
use credhub_core::config::{AbuseConfig, AuthConfig, SchedulerConfig};
use credhub_core::traits::SubjectStatus;
use credhub_core::ErrorKind;
use credhub_worker::{LifecycleScheduler, MockLedgerGateway};

const CLIENT_IP: &str = "203.0.113.99";

struct TestStack {
    issuer: TokenIssuer,
    gate: AuthGate,
    roles: RoleGate,
    sink: Arc<MemorySink>,
}

fn stack() -> TestStack {
    let (audit, sink) = AuditLog::in_memory();
    let audit = Arc::new(audit);
    let auth_config = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        ..AuthConfig::default()
    };
    let issuer = TokenIssuer::new(&auth_config, Arc::clone(&audit));
    let verifier = Arc::new(TokenVerifier::new(&auth_config, Arc::clone(&audit)));
    let tracker = Arc::new(AbuseTracker::new(
        Arc::new(MemoryAbuseStore::new()),
        Arc::clone(&audit),
        AbuseConfig::default(),
    ));
    TestStack {
        issuer,
        gate: AuthGate::new(tracker, verifier, Arc::clone(&audit)),
        roles: RoleGate::new(Arc::clone(&audit)),
        sink,
    }
}

fn origin(endpoint: &str) -> RequestOrigin {
    RequestOrigin::new(CLIENT_IP, endpoint)
}

#[tokio::test]
async fn issued_token_passes_gate_and_role_check() {
    let stack = stack();
    let origin = origin("/api/registry");

    let issued = stack
        .issuer
        .issue("SUBJ0001", Role::Authority, &origin)
        .unwrap();
    let header = format!("Bearer {}", issued.token);

    let claims = stack
        .gate
        .authenticate(Some(&header), CLIENT_IP, &origin)
        .await
        .unwrap();
    assert_eq!(claims.sub, "SUBJ0001");

    stack
        .roles
        .require(&claims, &[Role::Authority], &origin)
        .unwrap();

    // A subject-only endpoint rejects the same claims.
    let err = stack
        .roles
        .require(&claims, &[Role::Subject], &origin)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InsufficientPermissions);
}

#[tokio::test(start_paused = true)]
async fn ban_blocks_valid_credentials_until_it_expires() {
    let stack = stack();
    let origin = origin("/api/auth");

    for _ in 0..5 {
        let err = stack
            .gate
            .authenticate(Some("Bearer not.a.token"), CLIENT_IP, &origin)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedCredential);
    }

    let issued = stack
        .issuer
        .issue("SUBJ0002", Role::Subject, &origin)
        .unwrap();
    let header = format!("Bearer {}", issued.token);

    let err = stack
        .gate
        .authenticate(Some(&header), CLIENT_IP, &origin)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Banned);

    // After the temporary ban lapses the same credentials are accepted.
    tokio::time::sleep(tokio::time::Duration::from_secs(61 * 60)).await;

    let claims = stack
        .gate
        .authenticate(Some(&header), CLIENT_IP, &origin)
        .await
        .unwrap();
    assert_eq!(claims.sub, "SUBJ0002");

    let bans = stack.sink.events_of_kind("SUSPICIOUS_ACTIVITY");
    assert!(bans
        .iter()
        .any(|e| e.detail["kind"] == "identifier_banned"));
}

#[tokio::test(start_paused = true)]
async fn scheduler_expires_overdue_subject_and_audits_transaction() {
    let (audit, sink) = AuditLog::in_memory();
    let ledger = Arc::new(MockLedgerGateway::new());
    ledger.set_status(
        "SUBJ0003",
        SubjectStatus {
            verified: true,
            expires_at: 1,
            active: true,
        },
    );

    let scheduler = Arc::new(LifecycleScheduler::new(
        Arc::clone(&ledger) as Arc<dyn credhub_core::traits::LedgerGateway>,
        Arc::new(audit),
        SchedulerConfig {
            enabled: true,
            interval_minutes: 60,
        },
    ));

    scheduler.track("SUBJ0003").await;
    scheduler.start().await;

    // The first pass fires immediately on start.
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

    assert_eq!(ledger.expire_calls("SUBJ0003"), 1);
    let txs = sink.events_of_kind("LEDGER_TX");
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].detail["txHash"], "0xmockSUBJ0003");

    let status = scheduler.status().await;
    assert!(status.running);
    assert_eq!(status.tracked_count, 0);

    scheduler.stop().await;
    assert!(!scheduler.status().await.running);
}
