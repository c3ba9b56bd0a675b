//! Ledger store
//!
//! Append-only: the only write is [`LedgerRepository::append`], and it needs
//! an open unit of work owned by the caller.

use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::models::{EventType, LedgerEntry, NewLedgerEntry};
use crate::db::WriteUnit;
use crate::pagination::PageRequest;

const LEDGER_COLUMNS: &str = "entry_id, account_id, delta, balance_after, event_type, transfer_id, reference, metadata, created_at";

pub struct LedgerRepository;

impl LedgerRepository {
    /// Append one entry, returning its ID
    pub async fn append(
        unit: &mut WriteUnit<'_>,
        entry: &NewLedgerEntry,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO ledger_entries
                   (account_id, delta, balance_after, event_type, transfer_id, reference, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.account_id)
        .bind(entry.delta)
        .bind(entry.balance_after)
        .bind(entry.event_type.as_str())
        .bind(entry.transfer_id)
        .bind(&entry.reference)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(unit.conn())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Newest-first page of an account's entries, plus the total count
    pub async fn list_by_account(
        pool: &SqlitePool,
        account_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, i64), sqlx::Error> {
        // Count and page read the same snapshot
        let mut tx = pool.begin().await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE account_id = ?")
                .bind(account_id)
                .fetch_one(&mut *tx)
                .await?;

        let rows = sqlx::query(&format!(
            r#"SELECT {LEDGER_COLUMNS} FROM ledger_entries
               WHERE account_id = ?
               ORDER BY entry_id DESC
               LIMIT ? OFFSET ?"#
        ))
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let entries = rows.iter().map(row_to_entry).collect::<Result<_, _>>()?;
        Ok((entries, total))
    }

    /// Every entry of an account in application order
    pub async fn history<'e, E>(executor: E, account_id: i64) -> Result<Vec<LedgerEntry>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE account_id = ? ORDER BY entry_id"
        ))
        .bind(account_id)
        .fetch_all(executor)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Entries linked to one transfer, in application order
    pub async fn list_by_transfer<'e, E>(
        executor: E,
        transfer_id: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE transfer_id = ? ORDER BY entry_id"
        ))
        .bind(transfer_id)
        .fetch_all(executor)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<LedgerEntry, sqlx::Error> {
    let event_type: String = row.try_get("event_type")?;
    let event_type = event_type
        .parse::<EventType>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(LedgerEntry {
        entry_id: row.try_get("entry_id")?,
        account_id: row.try_get("account_id")?,
        delta: row.try_get("delta")?,
        balance_after: row.try_get("balance_after")?,
        event_type,
        transfer_id: row.try_get("transfer_id")?,
        reference: row.try_get("reference")?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
    })
}
