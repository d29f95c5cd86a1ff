//! Credential issuance configuration.

use serde::{Deserialize, Serialize};

/// Credential signing and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for credential signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Issuance window: hours between issued-at and expiry.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Maximum age in days of a credential's issued-at timestamp for it to
    /// still be eligible for refresh.
    #[serde(default = "default_refresh_max_age")]
    pub refresh_max_age_days: u64,
}

impl AuthConfig {
    /// Issuance window as a chrono duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours as i64)
    }

    /// Maximum refreshable credential age as a chrono duration.
    pub fn refresh_max_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_max_age_days as i64)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
            refresh_max_age_days: default_refresh_max_age(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_refresh_max_age() -> u64 {
    7
}
