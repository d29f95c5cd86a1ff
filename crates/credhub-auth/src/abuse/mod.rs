//! Adaptive abuse protection.
//!
//! Tracks failed authentication attempts per identifier within a sliding
//! window and escalates to temporary or permanent denial. State lives
//! behind the [`AbuseStore`] seam so the same escalation logic can run
//! against an external cache when scaling past one process.

pub mod cleanup;
pub mod memory;
pub mod store;
pub mod tracker;

pub use cleanup::AbuseCleanup;
pub use memory::MemoryAbuseStore;
pub use store::{AbuseStore, AttemptRecord, BanReason, BanRecord};
pub use tracker::{AbuseStats, AbuseTracker, SweepResult};
