//! # credhub-core
//!
//! Core error handling, configuration, audit logging, and shared traits
//! for the CredHub credential and registry-lifecycle service.
//!
//! ## Modules
//!
//! - `error` / `result` — unified `AppError` taxonomy and `AppResult` alias
//! - `config` — TOML + environment configuration schemas
//! - `audit` — append-only structured security audit log
//! - `shortid` — collision-resistant short subject identifiers
//! - `task` — cancellable periodic background tasks
//! - `traits` — the external ledger gateway seam

pub mod audit;
pub mod config;
pub mod error;
pub mod result;
pub mod shortid;
pub mod task;
pub mod traits;

pub use audit::{AuditEvent, AuditLevel, AuditLog, RequestOrigin};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use task::PeriodicTask;
pub use traits::{LedgerGateway, SubjectStatus, TxReceipt};
