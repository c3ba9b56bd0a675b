//! Data models for point accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::validation::{PersonName, ValidationError};
use crate::ledger::EventType;

/// Account: profile fields plus the point balance
///
/// `balance` changes only inside a write unit, together with a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-account request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Profile that passed validation, ready to insert
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl TryFrom<CreateAccountRequest> for NewAccount {
    type Error = ValidationError;

    fn try_from(req: CreateAccountRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            first_name: PersonName::new("first_name", &req.first_name)?,
            last_name: PersonName::new("last_name", &req.last_name)?,
            email: non_empty(req.email),
            phone: non_empty(req.phone),
            avatar_url: non_empty(req.avatar_url),
            bio: non_empty(req.bio),
        })
    }
}

/// Partial profile update. Absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

/// Non-transfer balance event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointsKind {
    /// Credit `amount`
    Earn,
    /// Debit `amount`
    Redeem,
    /// Apply `amount` as a signed delta
    Adjust,
}

impl PointsKind {
    pub fn event_type(&self) -> EventType {
        match self {
            PointsKind::Earn => EventType::Earn,
            PointsKind::Redeem => EventType::Redeem,
            PointsKind::Adjust => EventType::Adjust,
        }
    }
}

/// Earn/redeem/adjust request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PointsRequest {
    pub kind: PointsKind,
    pub amount: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Treat `Some("")` as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_kind_event_type() {
        assert_eq!(PointsKind::Earn.event_type(), EventType::Earn);
        assert_eq!(PointsKind::Redeem.event_type(), EventType::Redeem);
        assert_eq!(PointsKind::Adjust.event_type(), EventType::Adjust);
    }

    #[test]
    fn test_points_request_deserialize() {
        let req: PointsRequest =
            serde_json::from_str(r#"{"kind":"earn","amount":500,"reference":"signup"}"#).unwrap();
        assert_eq!(req.kind, PointsKind::Earn);
        assert_eq!(req.amount, 500);
        assert_eq!(req.reference.as_deref(), Some("signup"));
        assert!(req.metadata.is_none());
    }

    #[test]
    fn test_new_account_from_request() {
        let req = CreateAccountRequest {
            first_name: "Tom".into(),
            last_name: "Lee".into(),
            email: Some(String::new()),
            bio: Some("hi".into()),
            ..Default::default()
        };
        let new = NewAccount::try_from(req).unwrap();
        assert_eq!(new.first_name.as_str(), "Tom");
        assert_eq!(new.email, None);
        assert_eq!(new.bio.as_deref(), Some("hi"));
    }

    #[test]
    fn test_new_account_rejects_long_last_name() {
        let req = CreateAccountRequest {
            first_name: "Tom".into(),
            last_name: "Johnson".into(),
            ..Default::default()
        };
        assert!(matches!(
            NewAccount::try_from(req),
            Err(ValidationError::TooLong { field: "last_name", .. })
        ));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
