//! Transfer core types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::state::TransferStatus;

/// Server-minted transfer receipt (UUID v4)
///
/// One per accepted submission; it is the only external handle for
/// retrieving the transfer later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyToken(Uuid);

impl IdempotencyToken {
    /// Mint a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IdempotencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for IdempotencyToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Which end of a transfer an account is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountSide {
    Source,
    Destination,
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSide::Source => write!(f, "Source"),
            AccountSide::Destination => write!(f, "Destination"),
        }
    }
}

/// Submission request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[serde(alias = "fromUserId")]
    pub from_account_id: i64,
    #[serde(alias = "toUserId")]
    pub to_account_id: i64,
    pub amount: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Stored transfer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Transfer {
    pub transfer_id: i64,
    #[schema(value_type = String)]
    pub idempotency_token: IdempotencyToken,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transfer {
    /// Completed transfer about to be inserted. `transfer_id` is assigned by
    /// the store.
    pub fn completed(
        token: IdempotencyToken,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            transfer_id: 0,
            idempotency_token: token,
            from_account_id,
            to_account_id,
            amount,
            status: TransferStatus::Completed,
            note,
            fail_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
        }
    }
}
