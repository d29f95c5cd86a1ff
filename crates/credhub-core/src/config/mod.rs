//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod abuse;
pub mod audit;
pub mod auth;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod scheduler;

use serde::{Deserialize, Serialize};

pub use self::abuse::AbuseConfig;
pub use self::audit::AuditConfig;
pub use self::auth::AuthConfig;
pub use self::ledger::LedgerConfig;
pub use self::logging::LoggingConfig;
pub use self::registry::RegistryConfig;
pub use self::scheduler::SchedulerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential issuance and verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Abuse tracker thresholds and windows.
    #[serde(default)]
    pub abuse: AbuseConfig,
    /// Identity lifecycle scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// External ledger gateway settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Audit log sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Subject registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CREDHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CREDHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            abuse: AbuseConfig::default(),
            scheduler: SchedulerConfig::default(),
            ledger: LedgerConfig::default(),
            audit: AuditConfig::default(),
            registry: RegistryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
