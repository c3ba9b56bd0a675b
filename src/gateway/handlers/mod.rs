//! HTTP handlers, one submodule per resource

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{
    LedgerQuery, audit_ledger, create_account, delete_account, get_account, get_ledger,
    list_accounts, post_points, update_account,
};
pub use health::{HealthResponse, health_check};
pub use transfer::{IDEMPOTENCY_KEY, ListTransfersQuery, create_transfer, get_transfer, list_transfers};
