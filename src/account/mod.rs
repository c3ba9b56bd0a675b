//! Account management module
//!
//! Profiles and point balances. Balances only change inside a write unit,
//! together with a ledger entry.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::AccountError;
pub use models::{
    Account, CreateAccountRequest, NewAccount, PointsKind, PointsRequest, UpdateAccountRequest,
};
pub use repository::AccountRepository;
pub use service::AccountService;
pub use validation::{MAX_NAME_CHARS, PersonName, ValidationError};
