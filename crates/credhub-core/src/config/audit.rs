//! Audit log sink configuration.

use serde::{Deserialize, Serialize};

/// Append-only audit log sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path to the security audit log file.
    #[serde(default = "default_file")]
    pub file: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
        }
    }
}

fn default_file() -> String {
    "logs/security.log".to_string()
}
