//! Transfer Database Layer
//!
//! Writes go through the caller's [`WriteUnit`]; lookups take any executor.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::error::TransferError;
use super::state::TransferStatus;
use super::types::{IdempotencyToken, Transfer};
use crate::db::WriteUnit;
use crate::pagination::PageRequest;

const TRANSFER_COLUMNS: &str = "transfer_id, idempotency_token, from_account_id, to_account_id, amount, status, note, fail_reason, created_at, updated_at, completed_at";

/// Transfer store
pub struct TransferDb;

impl TransferDb {
    /// Insert a transfer record, returning its ID
    ///
    /// A token collision fails with [`TransferError::DuplicateToken`], never
    /// silently.
    pub async fn insert(
        unit: &mut WriteUnit<'_>,
        transfer: &Transfer,
    ) -> Result<i64, TransferError> {
        let result = sqlx::query(
            r#"INSERT INTO transfers
                   (idempotency_token, from_account_id, to_account_id, amount, status,
                    note, fail_reason, created_at, updated_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(transfer.idempotency_token.to_string())
        .bind(transfer.from_account_id)
        .bind(transfer.to_account_id)
        .bind(transfer.amount)
        .bind(transfer.status.as_str())
        .bind(&transfer.note)
        .bind(&transfer.fail_reason)
        .bind(transfer.created_at)
        .bind(transfer.updated_at)
        .bind(transfer.completed_at)
        .execute(unit.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Exact-match lookup by token string
    pub async fn get_by_token<'e, E>(
        executor: E,
        token: &str,
    ) -> Result<Option<Transfer>, TransferError>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE idempotency_token = ?"
        ))
        .bind(token)
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_transfer).transpose()
    }

    pub async fn get_by_id<'e, E>(
        executor: E,
        transfer_id: i64,
    ) -> Result<Option<Transfer>, TransferError>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers WHERE transfer_id = ?"
        ))
        .bind(transfer_id)
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_transfer).transpose()
    }

    /// Transfers where the account is either side, newest first, plus the
    /// total count
    pub async fn list_by_account(
        pool: &SqlitePool,
        account_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Transfer>, i64), TransferError> {
        // Count and page read the same snapshot
        let mut tx = pool.begin().await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers WHERE from_account_id = ?1 OR to_account_id = ?1",
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

        let rows = sqlx::query(&format!(
            r#"SELECT {TRANSFER_COLUMNS} FROM transfers
               WHERE from_account_id = ?1 OR to_account_id = ?1
               ORDER BY transfer_id DESC
               LIMIT ?2 OFFSET ?3"#
        ))
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let transfers = rows
            .iter()
            .map(row_to_transfer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transfers, total))
    }

    /// Compare-and-set status update
    ///
    /// Returns true if the row was in `expected` and moved to `next`. Only
    /// forward transitions are accepted.
    pub async fn update_status_if(
        unit: &mut WriteUnit<'_>,
        transfer_id: i64,
        expected: TransferStatus,
        next: TransferStatus,
        fail_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, TransferError> {
        if !expected.can_transition_to(next) {
            return Err(TransferError::InvalidStateTransition {
                from: expected,
                to: next,
            });
        }

        let completed_at = (next == TransferStatus::Completed).then_some(now);
        let result = sqlx::query(
            r#"UPDATE transfers
               SET status = ?, fail_reason = COALESCE(?, fail_reason),
                   completed_at = COALESCE(?, completed_at), updated_at = ?
               WHERE transfer_id = ? AND status = ?"#,
        )
        .bind(next.as_str())
        .bind(fail_reason)
        .bind(completed_at)
        .bind(now)
        .bind(transfer_id)
        .bind(expected.as_str())
        .execute(unit.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_transfer(row: &SqliteRow) -> Result<Transfer, TransferError> {
    let token: String = row.try_get("idempotency_token")?;
    let idempotency_token = token
        .parse::<IdempotencyToken>()
        .map_err(|e| TransferError::DatabaseError(format!("Invalid stored token: {}", e)))?;

    let status: String = row.try_get("status")?;
    let status = status
        .parse::<TransferStatus>()
        .map_err(TransferError::DatabaseError)?;

    Ok(Transfer {
        transfer_id: row.try_get("transfer_id")?,
        idempotency_token,
        from_account_id: row.try_get("from_account_id")?,
        to_account_id: row.try_get("to_account_id")?,
        amount: row.try_get("amount")?,
        status,
        note: row.try_get("note")?,
        fail_reason: row.try_get("fail_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}
