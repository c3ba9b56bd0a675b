//! Ledger replay
//!
//! Rebuilds an account's balance history from its entries alone and compares
//! it against the `balance_after` snapshots and the stored balance.

use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::models::LedgerEntry;
use super::repository::LedgerRepository;
use crate::account::AccountRepository;

/// Result of replaying one account's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LedgerAudit {
    pub account_id: i64,
    /// Balance column in the accounts relation
    pub stored_balance: i64,
    /// Sum of every entry's delta, starting from zero
    pub replayed_balance: i64,
    pub entries: usize,
    /// First entry whose snapshot disagrees with the running sum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_mismatch: Option<i64>,
    pub consistent: bool,
}

impl LedgerAudit {
    /// Replay `entries` (in application order) from a zero balance
    pub fn replay(account_id: i64, stored_balance: i64, entries: &[LedgerEntry]) -> Self {
        let mut running: i64 = 0;
        let mut first_mismatch = None;

        for entry in entries {
            running = running.saturating_add(entry.delta);
            if first_mismatch.is_none() && entry.balance_after != running {
                first_mismatch = Some(entry.entry_id);
            }
        }

        Self {
            account_id,
            stored_balance,
            replayed_balance: running,
            entries: entries.len(),
            first_mismatch,
            consistent: first_mismatch.is_none() && running == stored_balance,
        }
    }
}

/// Audit one account against a single committed snapshot.
///
/// Returns `None` if the account does not exist.
pub async fn audit(pool: &SqlitePool, account_id: i64) -> Result<Option<LedgerAudit>, sqlx::Error> {
    // Both reads inside one read transaction so a concurrent commit can't
    // land between them.
    let mut tx = pool.begin().await?;

    let Some(stored) = AccountRepository::balance(&mut *tx, account_id).await? else {
        return Ok(None);
    };
    let entries = LedgerRepository::history(&mut *tx, account_id).await?;
    tx.commit().await?;

    let report = LedgerAudit::replay(account_id, stored, &entries);
    if !report.consistent {
        tracing::error!(
            account_id,
            stored_balance = report.stored_balance,
            replayed_balance = report.replayed_balance,
            first_mismatch = ?report.first_mismatch,
            "Ledger replay disagrees with stored balance"
        );
    }
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EventType;
    use chrono::Utc;

    fn entry(entry_id: i64, delta: i64, balance_after: i64) -> LedgerEntry {
        LedgerEntry {
            entry_id,
            account_id: 1,
            delta,
            balance_after,
            event_type: if delta >= 0 {
                EventType::Earn
            } else {
                EventType::Redeem
            },
            transfer_id: None,
            reference: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_ledger_matches_zero_balance() {
        let report = LedgerAudit::replay(1, 0, &[]);
        assert!(report.consistent);
        assert_eq!(report.entries, 0);
        assert_eq!(report.replayed_balance, 0);

        assert!(!LedgerAudit::replay(1, 5, &[]).consistent);
    }

    #[test]
    fn test_consistent_history() {
        let entries = [entry(1, 100, 100), entry(2, -30, 70), entry(3, 5, 75)];
        let report = LedgerAudit::replay(1, 75, &entries);
        assert!(report.consistent);
        assert_eq!(report.replayed_balance, 75);
        assert_eq!(report.first_mismatch, None);
    }

    #[test]
    fn test_reports_first_bad_snapshot() {
        let entries = [entry(1, 100, 100), entry(2, -30, 60), entry(3, 5, 65)];
        let report = LedgerAudit::replay(1, 75, &entries);
        assert!(!report.consistent);
        assert_eq!(report.first_mismatch, Some(2));
        assert_eq!(report.replayed_balance, 75);
    }

    #[test]
    fn test_stored_balance_drift() {
        let entries = [entry(1, 100, 100)];
        let report = LedgerAudit::replay(1, 90, &entries);
        assert_eq!(report.first_mismatch, None);
        assert!(!report.consistent);
    }

    #[tokio::test]
    async fn test_audit_unknown_account() {
        let db = crate::db::Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        assert!(audit(db.pool(), 42).await.unwrap().is_none());
    }
}
