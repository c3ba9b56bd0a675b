use thiserror::Error;

use super::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Account {0} not found")]
    NotFound(i64),

    #[error("Account {0} has transfer or ledger history and cannot be deleted")]
    HasHistory(i64),

    #[error("Invalid points amount: {0}")]
    InvalidPoints(&'static str),

    #[error("Insufficient balance: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: i64, requested: i64 },

    #[error("Balance would overflow")]
    BalanceOverflow,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::Validation(_) => "INVALID_PARAMETER",
            AccountError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            AccountError::HasHistory(_) => "ACCOUNT_HAS_HISTORY",
            AccountError::InvalidPoints(_) => "INVALID_AMOUNT",
            AccountError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AccountError::BalanceOverflow => "BALANCE_OVERFLOW",
            AccountError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::Validation(_)
            | AccountError::InvalidPoints(_)
            | AccountError::BalanceOverflow => 400,
            AccountError::NotFound(_) => 404,
            AccountError::HasHistory(_) => 409,
            AccountError::InsufficientBalance { .. } => 422,
            AccountError::Database(_) => 500,
        }
    }
}
