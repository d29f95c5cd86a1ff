//! Credential verification.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::json;

use credhub_core::audit::{AuditLog, RequestOrigin};
use credhub_core::config::AuthConfig;
use credhub_core::error::AppError;
use credhub_core::result::AppResult;

use super::claims::Claims;

/// Validates signed credentials.
///
/// The cryptographic verify runs before any embedded claim is trusted, so
/// a forged token can never present a non-expired expiry.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration (zero leeway: expiry is exact).
    validation: Validation,
    /// Audit log for verification outcomes.
    audit: Arc<AuditLog>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig, audit: Arc<AuditLog>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            audit,
        }
    }

    /// Decodes and validates a token, returning its claims.
    ///
    /// Every outcome is audited with the requesting origin. Failure
    /// messages are stable and never echo internal signing errors.
    pub fn verify(&self, token: &str, origin: &RequestOrigin) -> AppResult<Claims> {
        let result = decode::<Claims>(token, &self.decoding_key, &self.validation);

        match result {
            Ok(data) => {
                self.audit.auth_success(
                    &data.claims.sub,
                    json!({ "ip": origin.ip, "endpoint": origin.endpoint }),
                );
                Ok(data.claims)
            }
            Err(e) => {
                let err = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::expired_credential("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::invalid_signature("Token signature is invalid")
                    }
                    _ => AppError::malformed_credential("Token is malformed"),
                };

                self.audit.auth_failure(
                    &err.kind.to_string().to_lowercase(),
                    &origin.ip,
                    json!({ "ip": origin.ip, "endpoint": origin.endpoint }),
                );

                Err(err)
            }
        }
    }
}
