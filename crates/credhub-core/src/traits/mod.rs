//! Shared trait seams between CredHub crates.

pub mod ledger;

pub use ledger::{LedgerGateway, SubjectStatus, TxReceipt};
