//! Credential creation and refresh with configurable signing and TTL.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::json;

use credhub_core::audit::{AuditLog, RequestOrigin};
use credhub_core::config::AuthConfig;
use credhub_core::error::AppError;
use credhub_core::result::AppResult;

use super::claims::{Claims, Role};

/// A freshly issued credential.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// The signed bearer token.
    pub token: String,
    /// Expiry of the token.
    pub expires_at: DateTime<Utc>,
}

/// Creates and refreshes signed credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verifying refresh candidates.
    decoding_key: DecodingKey,
    /// Issuance window between issued-at and expiry.
    token_ttl: Duration,
    /// Maximum issued-at age for refresh eligibility.
    refresh_max_age: Duration,
    /// Audit log for issuance events.
    audit: Arc<AuditLog>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish()
    }
}

impl TokenIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig, audit: Arc<AuditLog>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: config.token_ttl(),
            refresh_max_age: config.refresh_max_age(),
            audit,
        }
    }

    /// Issues a credential with the configured TTL.
    ///
    /// Always succeeds for well-formed input. Issuance itself is not
    /// rate-limited; callers are expected to have passed the abuse gate.
    pub fn issue(
        &self,
        subject_id: &str,
        role: Role,
        origin: &RequestOrigin,
    ) -> AppResult<IssuedToken> {
        self.issue_with_ttl(subject_id, role, self.token_ttl, origin)
    }

    /// Issues a credential with an explicit TTL.
    pub fn issue_with_ttl(
        &self,
        subject_id: &str,
        role: Role,
        ttl: Duration,
        origin: &RequestOrigin,
    ) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        self.audit.log(
            credhub_core::AuditLevel::Info,
            "TOKEN_ISSUED",
            json!({
                "subjectId": subject_id,
                "role": role.to_string(),
                "expiresAt": expires_at.timestamp(),
                "ip": origin.ip,
                "endpoint": origin.endpoint,
            }),
        );

        Ok(IssuedToken { token, expires_at })
    }

    /// Refreshes a credential, ignoring its expiry.
    ///
    /// A token older than the refresh window (issued-at, not expiry) is
    /// rejected with `TooOldToRefresh`. The new token carries a fresh
    /// issued-at and expiry for the same subject and role.
    pub fn refresh(&self, old_token: &str, origin: &RequestOrigin) -> AppResult<IssuedToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(old_token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::invalid_signature("Token signature is invalid")
                }
                _ => AppError::malformed_credential("Token is malformed"),
            })?;

        let age = Utc::now().timestamp() - claims.iat;
        if age > self.refresh_max_age.num_seconds() {
            self.audit.auth_failure(
                "token_too_old_to_refresh",
                &claims.sub,
                json!({ "ip": origin.ip, "endpoint": origin.endpoint, "tokenAgeSeconds": age }),
            );
            return Err(AppError::too_old_to_refresh(
                "Token is too old to refresh, please authenticate again",
            ));
        }

        let refreshed = self.issue(&claims.sub, claims.role, origin)?;

        self.audit.auth_success(
            &claims.sub,
            json!({
                "action": "token_refresh",
                "ip": origin.ip,
                "endpoint": origin.endpoint,
            }),
        );

        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credhub_core::ErrorKind;

    fn issuer() -> (TokenIssuer, Arc<credhub_core::audit::MemorySink>) {
        let (audit, sink) = AuditLog::in_memory();
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        (TokenIssuer::new(&config, Arc::new(audit)), sink)
    }

    fn origin() -> RequestOrigin {
        RequestOrigin::new("203.0.113.5", "/api/auth")
    }

    #[test]
    fn expiry_is_strictly_after_issuance() {
        let (issuer, _) = issuer();
        let issued = issuer.issue("SUBJ123", Role::Subject, &origin()).unwrap();
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn issuance_is_audited_with_origin() {
        let (issuer, sink) = issuer();
        issuer.issue("SUBJ123", Role::Authority, &origin()).unwrap();

        let events = sink.events_of_kind("TOKEN_ISSUED");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].detail["ip"], "203.0.113.5");
        assert_eq!(events[0].detail["endpoint"], "/api/auth");
        assert_eq!(events[0].detail["role"], "authority");
    }

    #[test]
    fn refresh_accepts_expired_token() {
        let (issuer, _) = issuer();
        let issued = issuer
            .issue_with_ttl("SUBJ123", Role::Subject, Duration::seconds(-10), &origin())
            .unwrap();

        let refreshed = issuer.refresh(&issued.token, &origin()).unwrap();
        assert!(refreshed.expires_at > Utc::now());
    }

    #[test]
    fn refresh_preserves_subject_and_role() {
        let (issuer, _) = issuer();
        let issued = issuer.issue("SUBJ777", Role::Authority, &origin()).unwrap();

        let refreshed = issuer.refresh(&issued.token, &origin()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(
            &refreshed.token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.sub, "SUBJ777");
        assert_eq!(claims.role, Role::Authority);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn refresh_rejects_token_older_than_window() {
        let (issuer, _) = issuer();
        let issued_at = Utc::now() - Duration::days(8);
        let claims = Claims {
            sub: "SUBJ123".to_string(),
            role: Role::Subject,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(24)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = issuer.refresh(&token, &origin()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooOldToRefresh);
    }

    #[test]
    fn refresh_rejects_garbage_signature() {
        let (issuer, _) = issuer();
        let issued = issuer.issue("SUBJ123", Role::Subject, &origin()).unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        let err = issuer.refresh(&tampered, &origin()).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::InvalidSignature | ErrorKind::MalformedCredential
        ));
    }
}
