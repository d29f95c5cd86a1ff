//! Unified application error types for CredHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Credential-path kinds carry stable,
//! non-leaking messages that are safe to surface to a caller.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No credential was presented on a request that requires one.
    MissingCredential,
    /// The presented credential is structurally invalid.
    MalformedCredential,
    /// The credential signature did not verify against the signing secret.
    InvalidSignature,
    /// The credential is past its expiry timestamp.
    ExpiredCredential,
    /// The credential's role is not permitted to perform the action.
    InsufficientPermissions,
    /// The credential's issued-at timestamp is too old to refresh.
    TooOldToRefresh,
    /// The requesting identifier is under an active ban.
    Banned,
    /// The external ledger could not be reached (timeout, connection refused).
    LedgerUnreachable,
    /// The external ledger rejected or failed the requested operation.
    LedgerError,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "MISSING_CREDENTIAL"),
            Self::MalformedCredential => write!(f, "MALFORMED_CREDENTIAL"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::ExpiredCredential => write!(f, "EXPIRED_CREDENTIAL"),
            Self::InsufficientPermissions => write!(f, "INSUFFICIENT_PERMISSIONS"),
            Self::TooOldToRefresh => write!(f, "TOO_OLD_TO_REFRESH"),
            Self::Banned => write!(f, "BANNED"),
            Self::LedgerUnreachable => write!(f, "LEDGER_UNREACHABLE"),
            Self::LedgerError => write!(f, "LEDGER_ERROR"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout CredHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a missing-credential error.
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredential, message)
    }

    /// Create a malformed-credential error.
    pub fn malformed_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedCredential, message)
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSignature, message)
    }

    /// Create an expired-credential error.
    pub fn expired_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredCredential, message)
    }

    /// Create an insufficient-permissions error.
    pub fn insufficient_permissions(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPermissions, message)
    }

    /// Create a too-old-to-refresh error.
    pub fn too_old_to_refresh(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooOldToRefresh, message)
    }

    /// Create a banned error.
    pub fn banned(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Banned, message)
    }

    /// Create a ledger-unreachable error.
    pub fn ledger_unreachable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LedgerUnreachable, message)
    }

    /// Create a ledger error.
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LedgerError, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
