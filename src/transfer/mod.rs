//! Point transfers
//!
//! # Architecture
//!
//! - [`TransferDb`]: durable transfer records keyed by idempotency token
//! - [`TransferEngine`]: validation, balance mutation, ledger append and
//!   status, committed as one unit of work
//!
//! # Invariants
//!
//! 1. **Closed system**: a transfer never creates or destroys points
//! 2. **Double entry**: every completed transfer has exactly one
//!    `transfer_out` and one `transfer_in` ledger entry, deltas summing to zero
//! 3. **No overdraft**: the source balance never goes negative
//! 4. **Last recipient**: a source may not send to the destination of its
//!    immediately preceding completed transfer

pub mod db;
pub mod engine;
pub mod error;
pub mod state;
pub mod types;

pub use db::TransferDb;
pub use engine::TransferEngine;
pub use error::TransferError;
pub use state::TransferStatus;
pub use types::{AccountSide, IdempotencyToken, Transfer, TransferRequest};
