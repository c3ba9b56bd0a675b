//! Schema for accounts, transfers and the point ledger

use sqlx::SqlitePool;

pub const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    account_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    avatar_url  TEXT,
    bio         TEXT,
    balance     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)
"#;

pub const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    transfer_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    idempotency_token TEXT NOT NULL UNIQUE,
    from_account_id   INTEGER NOT NULL REFERENCES accounts(account_id),
    to_account_id     INTEGER NOT NULL REFERENCES accounts(account_id),
    amount            INTEGER NOT NULL CHECK (amount > 0),
    status            TEXT NOT NULL CHECK (status IN
                          ('pending','processing','completed','failed','cancelled','reversed')),
    note              TEXT,
    fail_reason       TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    completed_at      TEXT,
    CHECK (from_account_id <> to_account_id)
)
"#;

pub const CREATE_LEDGER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_entries (
    entry_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id    INTEGER NOT NULL REFERENCES accounts(account_id),
    delta         INTEGER NOT NULL,
    balance_after INTEGER NOT NULL,
    event_type    TEXT NOT NULL CHECK (event_type IN
                      ('transfer_out','transfer_in','adjust','earn','redeem')),
    transfer_id   INTEGER REFERENCES transfers(transfer_id),
    reference     TEXT,
    metadata      TEXT,
    created_at    TEXT NOT NULL
)
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_from ON transfers(from_account_id)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_to ON transfers(to_account_id)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_created ON transfers(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_from_status ON transfers(from_account_id, status, transfer_id)",
    "CREATE INDEX IF NOT EXISTS idx_ledger_account ON ledger_entries(account_id)",
    "CREATE INDEX IF NOT EXISTS idx_ledger_transfer ON ledger_entries(transfer_id)",
    "CREATE INDEX IF NOT EXISTS idx_ledger_created ON ledger_entries(created_at)",
];

/// Create tables and indexes. Safe to run on every startup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Applying schema...");

    for ddl in [
        CREATE_ACCOUNTS_TABLE,
        CREATE_TRANSFERS_TABLE,
        CREATE_LEDGER_TABLE,
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Schema ready");
    Ok(())
}
