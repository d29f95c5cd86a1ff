//! # credhub-auth
//!
//! Credential issuance, verification, role scoping, and adaptive abuse
//! protection for CredHub.
//!
//! ## Modules
//!
//! - `jwt` — signed credential claims, issuance, refresh, and verification
//! - `bearer` — bearer-token header extraction
//! - `rbac` — role gate over verified claims
//! - `abuse` — per-identifier failure tracking and ban escalation
//! - `gate` — request pipeline composing the abuse gate with verification

pub mod abuse;
pub mod bearer;
pub mod gate;
pub mod jwt;
pub mod rbac;

pub use abuse::{AbuseCleanup, AbuseStats, AbuseStore, AbuseTracker, MemoryAbuseStore};
pub use gate::AuthGate;
pub use jwt::{Claims, IssuedToken, Role, TokenIssuer, TokenVerifier};
pub use rbac::RoleGate;
