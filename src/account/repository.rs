//! Repository layer for account rows
//!
//! Reads accept any executor (pool or an open unit of work). Every write
//! takes a `&mut WriteUnit`, so nothing here can commit on its own.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteExecutor;

use super::models::{Account, NewAccount};
use crate::db::WriteUnit;
use crate::transfer::TransferStatus;

const ACCOUNT_COLUMNS: &str = "account_id, first_name, last_name, email, phone, avatar_url, bio, balance, created_at, updated_at";

/// Account store
pub struct AccountRepository;

impl AccountRepository {
    /// All accounts, oldest first
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Account>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY account_id"
        ))
        .fetch_all(pool)
        .await
    }

    /// Get account by ID
    pub async fn get<'e, E>(executor: E, account_id: i64) -> Result<Option<Account>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?"
        ))
        .bind(account_id)
        .fetch_optional(executor)
        .await
    }

    /// Insert a new account with a zero balance, returning its ID
    pub async fn create(
        unit: &mut WriteUnit<'_>,
        account: &NewAccount,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO accounts
                   (first_name, last_name, email, phone, avatar_url, bio, balance, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)"#,
        )
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.avatar_url)
        .bind(&account.bio)
        .bind(now)
        .bind(now)
        .execute(unit.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite profile fields. The balance column is never written here.
    pub async fn update_profile(
        unit: &mut WriteUnit<'_>,
        account: &Account,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE accounts
               SET first_name = ?, last_name = ?, email = ?, phone = ?, avatar_url = ?, bio = ?,
                   updated_at = ?
               WHERE account_id = ?"#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.avatar_url)
        .bind(&account.bio)
        .bind(account.updated_at)
        .bind(account.account_id)
        .execute(unit.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(unit: &mut WriteUnit<'_>, account_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = ?")
            .bind(account_id)
            .execute(unit.conn())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True if any transfer or ledger entry references the account
    pub async fn has_history<'e, E>(executor: E, account_id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let found = sqlx::query_scalar::<_, i64>(
            r#"SELECT EXISTS(SELECT 1 FROM transfers
                             WHERE from_account_id = ?1 OR to_account_id = ?1)
                   OR EXISTS(SELECT 1 FROM ledger_entries WHERE account_id = ?1)"#,
        )
        .bind(account_id)
        .fetch_one(executor)
        .await?;

        Ok(found != 0)
    }

    /// Add `delta` to the balance. Returns false if the account does not exist.
    pub async fn adjust_balance(
        unit: &mut WriteUnit<'_>,
        account_id: i64,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET balance = balance + ?, updated_at = ? WHERE account_id = ?",
        )
        .bind(delta)
        .bind(now)
        .bind(account_id)
        .execute(unit.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn balance<'e, E>(executor: E, account_id: i64) -> Result<Option<i64>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT balance FROM accounts WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(executor)
            .await
    }

    /// Destination of the most recent completed transfer sent by `account_id`
    ///
    /// Derived from the transfers relation on every call; `None` until the
    /// account has completed its first transfer.
    pub async fn last_completed_recipient<'e, E>(
        executor: E,
        account_id: i64,
    ) -> Result<Option<i64>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT to_account_id FROM transfers
               WHERE from_account_id = ? AND status = ?
               ORDER BY transfer_id DESC
               LIMIT 1"#,
        )
        .bind(account_id)
        .bind(TransferStatus::Completed.as_str())
        .fetch_optional(executor)
        .await
    }
}
