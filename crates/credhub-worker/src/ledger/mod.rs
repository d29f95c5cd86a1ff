//! Ledger gateway implementations.

pub mod http;
pub mod mock;

pub use http::HttpLedgerGateway;
pub use mock::MockLedgerGateway;
