//! Account operations
//!
//! Profile CRUD plus earn/redeem/adjust point events. Every mutation runs in
//! a single-writer unit of work; point events also append one ledger entry,
//! so an account's balance is always the sum of its entries.

use chrono::Utc;
use std::sync::Arc;

use super::error::AccountError;
use super::models::{
    Account, CreateAccountRequest, NewAccount, PointsKind, PointsRequest, UpdateAccountRequest,
    non_empty,
};
use super::repository::AccountRepository;
use super::validation::PersonName;
use crate::db::Database;
use crate::ledger::{self, LedgerAudit, LedgerEntry, LedgerRepository, NewLedgerEntry};
use crate::pagination::{Page, PageRequest};

pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Account>, AccountError> {
        Ok(AccountRepository::list(self.db.pool()).await?)
    }

    pub async fn get(&self, account_id: i64) -> Result<Account, AccountError> {
        AccountRepository::get(self.db.pool(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Create an account with a zero balance
    pub async fn create(&self, request: CreateAccountRequest) -> Result<Account, AccountError> {
        let new = NewAccount::try_from(request)?;

        let mut unit = self.db.begin_write().await?;
        let account_id = AccountRepository::create(&mut unit, &new, Utc::now()).await?;
        let account = AccountRepository::get(unit.conn(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;
        unit.commit().await?;

        tracing::info!(account_id, "Account created");
        Ok(account)
    }

    /// Apply the supplied, non-empty profile fields
    pub async fn update(
        &self,
        account_id: i64,
        patch: UpdateAccountRequest,
    ) -> Result<Account, AccountError> {
        let first_name = non_empty(patch.first_name)
            .map(|v| PersonName::new("first_name", &v))
            .transpose()?;
        let last_name = non_empty(patch.last_name)
            .map(|v| PersonName::new("last_name", &v))
            .transpose()?;

        let mut unit = self.db.begin_write().await?;
        let mut account = AccountRepository::get(unit.conn(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        if let Some(name) = first_name {
            account.first_name = name.into_inner();
        }
        if let Some(name) = last_name {
            account.last_name = name.into_inner();
        }
        if let Some(email) = non_empty(patch.email) {
            account.email = Some(email);
        }
        if let Some(phone) = non_empty(patch.phone) {
            account.phone = Some(phone);
        }
        if let Some(avatar_url) = non_empty(patch.avatar_url) {
            account.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = non_empty(patch.bio) {
            account.bio = Some(bio);
        }
        account.updated_at = Utc::now();

        AccountRepository::update_profile(&mut unit, &account).await?;
        unit.commit().await?;

        tracing::info!(account_id, "Account updated");
        Ok(account)
    }

    /// Delete an account that no transfer or ledger entry references
    pub async fn delete(&self, account_id: i64) -> Result<(), AccountError> {
        let mut unit = self.db.begin_write().await?;
        if AccountRepository::get(unit.conn(), account_id)
            .await?
            .is_none()
        {
            return Err(AccountError::NotFound(account_id));
        }
        if AccountRepository::has_history(unit.conn(), account_id).await? {
            tracing::warn!(account_id, "Delete rejected: account has history");
            return Err(AccountError::HasHistory(account_id));
        }
        AccountRepository::delete(&mut unit, account_id).await?;
        unit.commit().await?;

        tracing::info!(account_id, "Account deleted");
        Ok(())
    }

    /// Earn, redeem or adjust points outside of a transfer
    pub async fn post_points(
        &self,
        account_id: i64,
        request: PointsRequest,
    ) -> Result<LedgerEntry, AccountError> {
        let delta = points_delta(request.kind, request.amount)?;

        let mut unit = self.db.begin_write().await?;
        let balance = AccountRepository::balance(unit.conn(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let new_balance = balance
            .checked_add(delta)
            .ok_or(AccountError::BalanceOverflow)?;
        if new_balance < 0 {
            tracing::warn!(account_id, balance, delta, "Points rejected: insufficient balance");
            return Err(AccountError::InsufficientBalance {
                balance,
                requested: -delta,
            });
        }

        let now = Utc::now();
        AccountRepository::adjust_balance(&mut unit, account_id, delta, now).await?;
        let balance_after = AccountRepository::balance(unit.conn(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let new_entry = NewLedgerEntry {
            account_id,
            delta,
            balance_after,
            event_type: request.kind.event_type(),
            transfer_id: None,
            reference: non_empty(request.reference),
            metadata: non_empty(request.metadata),
            created_at: now,
        };
        let entry_id = LedgerRepository::append(&mut unit, &new_entry).await?;
        unit.commit().await?;

        tracing::info!(
            account_id,
            entry_id,
            event = %new_entry.event_type,
            delta,
            balance_after,
            "Points posted"
        );
        Ok(LedgerEntry {
            entry_id,
            account_id,
            delta,
            balance_after,
            event_type: new_entry.event_type,
            transfer_id: None,
            reference: new_entry.reference,
            metadata: new_entry.metadata,
            created_at: now,
        })
    }

    /// Newest-first page of the account's ledger
    pub async fn ledger(
        &self,
        account_id: i64,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, AccountError> {
        self.get(account_id).await?;
        let (items, total) =
            LedgerRepository::list_by_account(self.db.pool(), account_id, page).await?;
        Ok(Page::new(items, page, total))
    }

    /// Replay the account's ledger against its stored balance
    pub async fn audit(&self, account_id: i64) -> Result<LedgerAudit, AccountError> {
        ledger::audit(self.db.pool(), account_id)
            .await?
            .ok_or(AccountError::NotFound(account_id))
    }
}

/// Signed balance change for a point event
fn points_delta(kind: PointsKind, amount: i64) -> Result<i64, AccountError> {
    match kind {
        PointsKind::Earn if amount > 0 => Ok(amount),
        PointsKind::Redeem if amount > 0 => Ok(-amount),
        PointsKind::Adjust if amount != 0 => Ok(amount),
        PointsKind::Earn | PointsKind::Redeem => Err(AccountError::InvalidPoints(
            "amount must be greater than zero",
        )),
        PointsKind::Adjust => Err(AccountError::InvalidPoints("adjustment must not be zero")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::validation::ValidationError;
    use crate::ledger::EventType;

    async fn setup() -> AccountService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.migrate().await.unwrap();
        AccountService::new(db)
    }

    fn create_req(first: &str, last: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            first_name: first.into(),
            last_name: last.into(),
            ..Default::default()
        }
    }

    fn points(kind: PointsKind, amount: i64) -> PointsRequest {
        PointsRequest {
            kind,
            amount,
            reference: None,
            metadata: None,
        }
    }

    #[test]
    fn test_points_delta() {
        assert_eq!(points_delta(PointsKind::Earn, 5).unwrap(), 5);
        assert_eq!(points_delta(PointsKind::Redeem, 5).unwrap(), -5);
        assert_eq!(points_delta(PointsKind::Adjust, -5).unwrap(), -5);
        assert!(points_delta(PointsKind::Earn, 0).is_err());
        assert!(points_delta(PointsKind::Redeem, -1).is_err());
        assert!(points_delta(PointsKind::Adjust, 0).is_err());
    }

    #[tokio::test]
    async fn test_create_starts_at_zero() {
        let service = setup().await;
        let account = service.create(create_req("Tom", "Lee")).await.unwrap();
        assert_eq!(account.balance, 0);
        assert_eq!(service.get(account.account_id).await.unwrap(), account);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_validates_names() {
        let service = setup().await;
        let err = service.create(create_req("", "Lee")).await.unwrap_err();
        assert!(matches!(
            err,
            AccountError::Validation(ValidationError::Required {
                field: "first_name"
            })
        ));
        // three characters, not three bytes
        assert!(service.create(create_req("李小龙", "Lee")).await.is_ok());
        assert!(service.create(create_req("Tom", "Long")).await.is_err());
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let service = setup().await;
        let account = service.create(create_req("Tom", "Lee")).await.unwrap();

        let updated = service
            .update(
                account.account_id,
                UpdateAccountRequest {
                    first_name: Some("Tim".into()),
                    last_name: Some(String::new()),
                    bio: Some("hello".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Tim");
        assert_eq!(updated.last_name, "Lee");
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert_eq!(service.get(account.account_id).await.unwrap(), updated);

        let too_long = UpdateAccountRequest {
            last_name: Some("Johnson".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(account.account_id, too_long).await,
            Err(AccountError::Validation(_))
        ));
        assert!(matches!(
            service.update(999, UpdateAccountRequest::default()).await,
            Err(AccountError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_post_points_keeps_ledger_in_step() {
        let service = setup().await;
        let id = service
            .create(create_req("Tom", "Lee"))
            .await
            .unwrap()
            .account_id;

        let earned = service
            .post_points(id, points(PointsKind::Earn, 500))
            .await
            .unwrap();
        assert_eq!(earned.balance_after, 500);
        assert_eq!(earned.event_type, EventType::Earn);

        let redeemed = service
            .post_points(id, points(PointsKind::Redeem, 200))
            .await
            .unwrap();
        assert_eq!(redeemed.delta, -200);
        assert_eq!(redeemed.balance_after, 300);

        let adjusted = service
            .post_points(id, points(PointsKind::Adjust, -50))
            .await
            .unwrap();
        assert_eq!(adjusted.balance_after, 250);

        assert_eq!(service.get(id).await.unwrap().balance, 250);
        let audit = service.audit(id).await.unwrap();
        assert!(audit.consistent);
        assert_eq!(audit.entries, 3);

        let page = service.ledger(id, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].entry_id, adjusted.entry_id);
    }

    #[tokio::test]
    async fn test_redeem_cannot_go_negative() {
        let service = setup().await;
        let id = service
            .create(create_req("Tom", "Lee"))
            .await
            .unwrap()
            .account_id;
        service
            .post_points(id, points(PointsKind::Earn, 10))
            .await
            .unwrap();

        let err = service
            .post_points(id, points(PointsKind::Redeem, 11))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::InsufficientBalance {
                balance: 10,
                requested: 11
            }
        ));
        assert!(
            service
                .post_points(id, points(PointsKind::Adjust, -11))
                .await
                .is_err()
        );
        assert_eq!(service.get(id).await.unwrap().balance, 10);
        assert_eq!(service.audit(id).await.unwrap().entries, 1);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let service = setup().await;
        let fresh = service.create(create_req("Ann", "Doe")).await.unwrap();
        let funded = service.create(create_req("Bob", "Cat")).await.unwrap();
        service
            .post_points(funded.account_id, points(PointsKind::Earn, 1))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(funded.account_id).await,
            Err(AccountError::HasHistory(_))
        ));
        service.delete(fresh.account_id).await.unwrap();
        assert!(matches!(
            service.delete(fresh.account_id).await,
            Err(AccountError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_account() {
        let service = setup().await;
        assert!(matches!(
            service.get(1).await,
            Err(AccountError::NotFound(1))
        ));
        assert!(matches!(
            service.post_points(1, points(PointsKind::Earn, 1)).await,
            Err(AccountError::NotFound(1))
        ));
        assert!(matches!(
            service.ledger(1, PageRequest::default()).await,
            Err(AccountError::NotFound(1))
        ));
        assert!(matches!(
            service.audit(1).await,
            Err(AccountError::NotFound(1))
        ));
    }
}
