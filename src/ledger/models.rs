//! Ledger entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// What kind of balance change an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TransferOut,
    TransferIn,
    Adjust,
    Earn,
    Redeem,
}

impl EventType {
    /// Storage/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TransferOut => "transfer_out",
            EventType::TransferIn => "transfer_in",
            EventType::Adjust => "adjust",
            EventType::Earn => "earn",
            EventType::Redeem => "redeem",
        }
    }

    /// Only the transfer engine writes these
    pub fn is_transfer(&self) -> bool {
        matches!(self, EventType::TransferOut | EventType::TransferIn)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer_out" => Ok(EventType::TransferOut),
            "transfer_in" => Ok(EventType::TransferIn),
            "adjust" => Ok(EventType::Adjust),
            "earn" => Ok(EventType::Earn),
            "redeem" => Ok(EventType::Redeem),
            other => Err(format!("Invalid event type: {}", other)),
        }
    }
}

/// Stored ledger entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LedgerEntry {
    pub entry_id: i64,
    pub account_id: i64,
    pub delta: i64,
    /// Account balance immediately after this entry was applied
    pub balance_after: i64,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry about to be appended
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub account_id: i64,
    pub delta: i64,
    pub balance_after: i64,
    pub event_type: EventType,
    pub transfer_id: Option<i64>,
    pub reference: Option<String>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewLedgerEntry {
    /// Debit side of a transfer
    pub fn transfer_out(
        account_id: i64,
        amount: i64,
        balance_after: i64,
        transfer_id: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            delta: -amount,
            balance_after,
            event_type: EventType::TransferOut,
            transfer_id: Some(transfer_id),
            reference: None,
            metadata: None,
            created_at,
        }
    }

    /// Credit side of a transfer
    pub fn transfer_in(
        account_id: i64,
        amount: i64,
        balance_after: i64,
        transfer_id: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            delta: amount,
            balance_after,
            event_type: EventType::TransferIn,
            transfer_id: Some(transfer_id),
            reference: None,
            metadata: None,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_str_roundtrip() {
        for event in [
            EventType::TransferOut,
            EventType::TransferIn,
            EventType::Adjust,
            EventType::Earn,
            EventType::Redeem,
        ] {
            assert_eq!(event.as_str().parse::<EventType>().unwrap(), event);
        }
        assert!("gift".parse::<EventType>().is_err());
    }

    #[test]
    fn test_event_type_serde_matches_storage_name() {
        assert_eq!(
            serde_json::to_string(&EventType::TransferOut).unwrap(),
            "\"transfer_out\""
        );
    }

    #[test]
    fn test_transfer_pair_deltas_cancel() {
        let now = Utc::now();
        let out = NewLedgerEntry::transfer_out(1, 100, 900, 7, now);
        let inn = NewLedgerEntry::transfer_in(2, 100, 100, 7, now);
        assert_eq!(out.delta + inn.delta, 0);
        assert_eq!(out.event_type, EventType::TransferOut);
        assert_eq!(inn.event_type, EventType::TransferIn);
        assert_eq!(out.transfer_id, inn.transfer_id);
        assert!(out.event_type.is_transfer());
        assert!(!EventType::Earn.is_transfer());
    }
}
