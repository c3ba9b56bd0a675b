//! Transfer Engine
//!
//! Orchestrates one transfer as a single atomic unit of work:
//!
//! ```text
//! amount > 0 → from != to → [writer lock + tx]
//!   → both accounts exist → last recipient != to → balance >= amount
//!   → insert transfer (completed) → adjust both balances
//!   → read back balances → append transfer_out / transfer_in → commit
//! ```
//!
//! The writer lock is held from the first existence check to the commit, so
//! the checks and the mutations see the same state. Any error drops the unit,
//! which rolls the transaction back before releasing the lock.

use chrono::Utc;
use std::sync::Arc;

use super::db::TransferDb;
use super::error::TransferError;
use super::types::{AccountSide, IdempotencyToken, Transfer, TransferRequest};
use crate::account::AccountRepository;
use crate::db::{Database, WriteUnit};
use crate::ledger::{LedgerRepository, NewLedgerEntry};
use crate::pagination::{Page, PageRequest};

pub struct TransferEngine {
    db: Arc<Database>,
}

impl TransferEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Validate and execute a transfer
    pub async fn submit(&self, request: TransferRequest) -> Result<Transfer, TransferError> {
        let TransferRequest {
            from_account_id: from,
            to_account_id: to,
            amount,
            note,
        } = request;

        if amount <= 0 {
            tracing::warn!(from, to, amount, "Transfer rejected: invalid amount");
            return Err(TransferError::InvalidAmount);
        }
        if from == to {
            tracing::warn!(from, "Transfer rejected: self transfer");
            return Err(TransferError::SelfTransferNotAllowed);
        }

        let mut unit = self.db.begin_write().await?;

        match apply(&mut unit, from, to, amount, note).await {
            Ok(transfer) => {
                unit.commit().await.map_err(|e| {
                    tracing::error!(from, to, amount, error = %e, "Transfer commit failed");
                    TransferError::from(e)
                })?;
                tracing::info!(
                    transfer_id = transfer.transfer_id,
                    token = %transfer.idempotency_token,
                    from,
                    to,
                    amount,
                    "Transfer completed"
                );
                Ok(transfer)
            }
            Err(e) => {
                // dropping the unit rolls back
                drop(unit);
                if e.is_rejection() {
                    tracing::warn!(from, to, amount, code = e.code(), "Transfer rejected: {}", e);
                } else {
                    tracing::error!(from, to, amount, error = %e, "Transfer aborted");
                }
                Err(e)
            }
        }
    }

    /// Exact-match lookup by idempotency token
    pub async fn retrieve_by_token(&self, token: &str) -> Result<Transfer, TransferError> {
        TransferDb::get_by_token(self.db.pool(), token)
            .await?
            .ok_or_else(|| TransferError::TransferNotFound(token.to_string()))
    }

    /// Transfers where the account is source or destination, newest first
    pub async fn list_for_account(
        &self,
        account_id: i64,
        page: PageRequest,
    ) -> Result<Page<Transfer>, TransferError> {
        let (items, total) = TransferDb::list_by_account(self.db.pool(), account_id, page).await?;
        Ok(Page::new(items, page, total))
    }
}

/// Checks and mutations, all against the open unit
async fn apply(
    unit: &mut WriteUnit<'_>,
    from: i64,
    to: i64,
    amount: i64,
    note: Option<String>,
) -> Result<Transfer, TransferError> {
    let source_balance = AccountRepository::balance(unit.conn(), from)
        .await?
        .ok_or(TransferError::AccountNotFound {
            side: AccountSide::Source,
            account_id: from,
        })?;
    let destination_balance = AccountRepository::balance(unit.conn(), to)
        .await?
        .ok_or(TransferError::AccountNotFound {
            side: AccountSide::Destination,
            account_id: to,
        })?;

    if AccountRepository::last_completed_recipient(unit.conn(), from).await? == Some(to) {
        return Err(TransferError::RepeatedRecipientNotAllowed);
    }

    if source_balance < amount {
        return Err(TransferError::InsufficientBalance {
            balance: source_balance,
            requested: amount,
        });
    }
    if destination_balance.checked_add(amount).is_none() {
        return Err(TransferError::BalanceOverflow);
    }

    let now = Utc::now();
    let mut transfer = Transfer::completed(
        IdempotencyToken::generate(),
        from,
        to,
        amount,
        note.filter(|n| !n.is_empty()),
        now,
    );
    transfer.transfer_id = TransferDb::insert(unit, &transfer).await?;

    if !AccountRepository::adjust_balance(unit, from, -amount, now).await? {
        return Err(TransferError::AccountNotFound {
            side: AccountSide::Source,
            account_id: from,
        });
    }
    if !AccountRepository::adjust_balance(unit, to, amount, now).await? {
        return Err(TransferError::AccountNotFound {
            side: AccountSide::Destination,
            account_id: to,
        });
    }

    let source_after = read_balance(unit, from, AccountSide::Source).await?;
    let destination_after = read_balance(unit, to, AccountSide::Destination).await?;

    LedgerRepository::append(
        unit,
        &NewLedgerEntry::transfer_out(from, amount, source_after, transfer.transfer_id, now),
    )
    .await?;
    LedgerRepository::append(
        unit,
        &NewLedgerEntry::transfer_in(to, amount, destination_after, transfer.transfer_id, now),
    )
    .await?;

    Ok(transfer)
}

async fn read_balance(
    unit: &mut WriteUnit<'_>,
    account_id: i64,
    side: AccountSide,
) -> Result<i64, TransferError> {
    AccountRepository::balance(unit.conn(), account_id)
        .await?
        .ok_or(TransferError::AccountNotFound { side, account_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EventType;

    async fn setup() -> (Arc<Database>, TransferEngine) {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.migrate().await.unwrap();
        let engine = TransferEngine::new(db.clone());
        (db, engine)
    }

    async fn account(db: &Database, balance: i64) -> i64 {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO accounts (first_name, last_name, created_at, updated_at) VALUES ('A', 'B', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid();

        if balance != 0 {
            let mut unit = db.begin_write().await.unwrap();
            AccountRepository::adjust_balance(&mut unit, id, balance, now)
                .await
                .unwrap();
            LedgerRepository::append(
                &mut unit,
                &NewLedgerEntry {
                    account_id: id,
                    delta: balance,
                    balance_after: balance,
                    event_type: EventType::Earn,
                    transfer_id: None,
                    reference: None,
                    metadata: None,
                    created_at: now,
                },
            )
            .await
            .unwrap();
            unit.commit().await.unwrap();
        }
        id
    }

    fn req(from: i64, to: i64, amount: i64) -> TransferRequest {
        TransferRequest {
            from_account_id: from,
            to_account_id: to,
            amount,
            note: None,
        }
    }

    async fn balance(db: &Database, id: i64) -> i64 {
        AccountRepository::balance(db.pool(), id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn transfer_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM transfers")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_moves_points_and_writes_ledger_pair() {
        let (db, engine) = setup().await;
        let x = account(&db, 10_000).await;
        let y = account(&db, 0).await;

        let transfer = engine.submit(req(x, y, 100)).await.unwrap();
        assert_eq!(transfer.amount, 100);
        assert_eq!(transfer.status, crate::transfer::TransferStatus::Completed);
        assert_eq!(balance(&db, x).await, 9_900);
        assert_eq!(balance(&db, y).await, 100);

        let entries = LedgerRepository::list_by_transfer(db.pool(), transfer.transfer_id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, EventType::TransferOut);
        assert_eq!(entries[0].account_id, x);
        assert_eq!(entries[0].delta, -100);
        assert_eq!(entries[0].balance_after, 9_900);
        assert_eq!(entries[1].event_type, EventType::TransferIn);
        assert_eq!(entries[1].account_id, y);
        assert_eq!(entries[1].balance_after, 100);
        assert_eq!(entries[0].delta + entries[1].delta, 0);

        let fetched = engine
            .retrieve_by_token(&transfer.idempotency_token.to_string())
            .await
            .unwrap();
        assert_eq!(fetched, transfer);
    }

    #[tokio::test]
    async fn test_check_order() {
        let (db, engine) = setup().await;
        let a = account(&db, 10).await;

        // amount is checked before anything else
        assert_eq!(
            engine.submit(req(a, a, 0)).await.unwrap_err(),
            TransferError::InvalidAmount
        );
        assert_eq!(
            engine.submit(req(a, a, 5)).await.unwrap_err(),
            TransferError::SelfTransferNotAllowed
        );
        // source side reported first when both are missing
        assert_eq!(
            engine.submit(req(998, 999, 5)).await.unwrap_err(),
            TransferError::AccountNotFound {
                side: AccountSide::Source,
                account_id: 998
            }
        );
        assert_eq!(
            engine.submit(req(a, 999, 5)).await.unwrap_err(),
            TransferError::AccountNotFound {
                side: AccountSide::Destination,
                account_id: 999
            }
        );
    }

    #[tokio::test]
    async fn test_repeated_recipient_rejected_before_balance() {
        let (db, engine) = setup().await;
        let a = account(&db, 10).await;
        let b = account(&db, 0).await;

        engine.submit(req(a, b, 10)).await.unwrap();
        // balance is now 0 but the repetition rule fires first
        assert_eq!(
            engine.submit(req(a, b, 5)).await.unwrap_err(),
            TransferError::RepeatedRecipientNotAllowed
        );
    }

    #[tokio::test]
    async fn test_last_recipient_not_any_recipient() {
        let (db, engine) = setup().await;
        let a = account(&db, 300).await;
        let b = account(&db, 0).await;
        let c = account(&db, 0).await;

        engine.submit(req(a, b, 100)).await.unwrap();
        engine.submit(req(a, c, 100)).await.unwrap();
        engine.submit(req(a, b, 100)).await.unwrap();

        assert_eq!(balance(&db, a).await, 0);
        assert_eq!(balance(&db, b).await, 200);
        assert_eq!(balance(&db, c).await, 100);
    }

    #[tokio::test]
    async fn test_rejection_leaves_no_side_effects() {
        let (db, engine) = setup().await;
        let a = account(&db, 50).await;
        let b = account(&db, 0).await;

        let err = engine.submit(req(a, b, 51)).await.unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                balance: 50,
                requested: 51
            }
        );
        assert_eq!(balance(&db, a).await, 50);
        assert_eq!(balance(&db, b).await, 0);
        assert_eq!(transfer_count(&db).await, 0);
        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(db.pool())
            .await
            .unwrap();
        // only the funding entry
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_destination_overflow_rejected() {
        let (db, engine) = setup().await;
        let a = account(&db, 10).await;
        let b = account(&db, i64::MAX - 5).await;

        assert_eq!(
            engine.submit(req(a, b, 10)).await.unwrap_err(),
            TransferError::BalanceOverflow
        );
        assert_eq!(balance(&db, a).await, 10);
    }

    #[tokio::test]
    async fn test_retrieve_unknown_token() {
        let (_db, engine) = setup().await;
        assert_eq!(
            engine.retrieve_by_token("nope").await.unwrap_err(),
            TransferError::TransferNotFound("nope".into())
        );
    }

    #[tokio::test]
    async fn test_list_for_account_empty() {
        let (db, engine) = setup().await;
        let a = account(&db, 0).await;
        let page = engine
            .list_for_account(a, PageRequest::clamped(0, 0))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test]
    async fn test_empty_note_is_dropped() {
        let (db, engine) = setup().await;
        let a = account(&db, 10).await;
        let b = account(&db, 0).await;
        let mut request = req(a, b, 1);
        request.note = Some(String::new());
        let transfer = engine.submit(request).await.unwrap();
        assert!(transfer.note.is_none());
    }
}
