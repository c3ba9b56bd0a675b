//! Points Ledger - point transfers with a double-entry audit trail
//!
//! Accounts hold an integer point balance. Every balance change is a ledger
//! entry, and every transfer is one atomic unit that moves points, writes the
//! `transfer_out`/`transfer_in` pair and records the transfer.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - SQLite pool, single-writer unit of work, schema
//! - [`pagination`] - page/size clamping shared by listings
//! - [`account`] - Account store, profiles and point events
//! - [`ledger`] - Append-only ledger and replay audit
//! - [`transfer`] - Transfer store and engine
//! - [`gateway`] - HTTP API

pub mod config;
pub mod logging;

// Storage
pub mod db;
pub mod pagination;

// Domain
pub mod account;
pub mod ledger;
pub mod transfer;

// HTTP
pub mod gateway;

// Convenient re-exports at crate root
pub use account::{Account, AccountError, AccountService};
pub use db::{Database, WriteUnit};
pub use ledger::{EventType, LedgerAudit, LedgerEntry};
pub use pagination::{Page, PageRequest};
pub use transfer::{Transfer, TransferEngine, TransferError, TransferRequest, TransferStatus};
