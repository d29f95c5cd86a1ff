//! # credhub-worker
//!
//! Background identity lifecycle scheduling for CredHub.
//!
//! This crate provides:
//! - The lifecycle scheduler that reconciles tracked subjects against the
//!   external ledger and triggers expiry transitions
//! - An HTTP ledger gateway client with per-request timeouts
//! - A scripted mock gateway for tests

pub mod ledger;
pub mod lifecycle;

pub use ledger::{HttpLedgerGateway, MockLedgerGateway};
pub use lifecycle::{LifecycleScheduler, SchedulerStatus};
