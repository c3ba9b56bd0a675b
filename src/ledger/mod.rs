//! Append-only point ledger
//!
//! Every balance change (transfer leg, earn, redeem, adjust) is recorded as
//! one [`LedgerEntry`] carrying the signed delta and the balance right after
//! it. Replaying the entries from zero must reproduce every snapshot and the
//! stored account balance; see [`audit`].

pub mod audit;
pub mod models;
pub mod repository;

pub use audit::{LedgerAudit, audit};
pub use models::{EventType, LedgerEntry, NewLedgerEntry};
pub use repository::LedgerRepository;
