//! Transfer Error Types

use thiserror::Error;

use super::state::TransferStatus;
use super::types::AccountSide;

/// Transfer error types
///
/// Validation failures are reported before any unit of work is opened or
/// while it is still empty, so none of them leave side effects behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Cannot transfer points to the same account")]
    SelfTransferNotAllowed,

    #[error("{side} account {account_id} not found")]
    AccountNotFound { side: AccountSide, account_id: i64 },

    #[error("Cannot transfer to the same recipient twice in a row")]
    RepeatedRecipientNotAllowed,

    // === Balance Errors ===
    #[error("Insufficient balance: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: i64 },

    #[error("Amount would overflow the destination balance")]
    BalanceOverflow,

    // === Lookup Errors ===
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition {
        from: TransferStatus,
        to: TransferStatus,
    },

    // === System Errors ===
    #[error("Idempotency token already exists")]
    DuplicateToken,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::SelfTransferNotAllowed => "SELF_TRANSFER_NOT_ALLOWED",
            TransferError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            TransferError::RepeatedRecipientNotAllowed => "REPEATED_RECIPIENT_NOT_ALLOWED",
            TransferError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TransferError::BalanceOverflow => "BALANCE_OVERFLOW",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            TransferError::DuplicateToken => "DUPLICATE_TOKEN",
            TransferError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount
            | TransferError::SelfTransferNotAllowed
            | TransferError::RepeatedRecipientNotAllowed
            | TransferError::BalanceOverflow => 400,
            TransferError::AccountNotFound { .. } | TransferError::TransferNotFound(_) => 404,
            TransferError::InsufficientBalance { .. } => 422,
            TransferError::InvalidStateTransition { .. }
            | TransferError::DuplicateToken
            | TransferError::DatabaseError(_) => 500,
        }
    }

    /// Caller-fixable rejection (as opposed to a storage failure)
    pub fn is_rejection(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                TransferError::DuplicateToken
            }
            _ => TransferError::DatabaseError(e.to_string()),
        }
    }
}
