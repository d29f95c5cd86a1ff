//! External ledger gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the external ledger gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Base URL of the ledger gateway.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds. A timed-out call is treated as a
    /// retryable failure, never as fatal.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// Gas ceiling for mutating (fee-bearing) ledger calls.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
}

impl LedgerConfig {
    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_seconds: default_timeout(),
            gas_limit: default_gas_limit(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8545".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_gas_limit() -> u64 {
    300_000
}
