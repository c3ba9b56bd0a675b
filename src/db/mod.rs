//! Database connection management
//!
//! SQLite through sqlx. Every mutation goes through a [`WriteUnit`]: a
//! transaction that also holds the process-wide writer lock, so at most one
//! unit of work is in flight at any time. Readers use the pool directly and
//! only ever observe committed state.

pub mod schema;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::DatabaseConfig;

/// SQLite connection pool plus the single-writer lock
pub struct Database {
    pool: SqlitePool,
    writer: Mutex<()>,
}

impl Database {
    /// Open (creating if missing) the database described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let in_memory = is_memory_url(&config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(config.acquire_timeout_ms));

        if in_memory {
            return Self::open(options, 1, config.acquire_timeout_ms).await;
        }

        options = options.journal_mode(SqliteJournalMode::Wal);
        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        Self::open(
            options,
            config.max_connections.max(1),
            config.acquire_timeout_ms,
        )
        .await
    }

    /// Fresh private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        Self::open(options, 1, 5000).await
    }

    async fn open(
        options: SqliteConnectOptions,
        max_connections: u32,
        acquire_timeout_ms: u64,
    ) -> Result<Self, sqlx::Error> {
        // An in-memory database lives only as long as one of its connections,
        // so connections are never recycled.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_millis(acquire_timeout_ms))
            .connect_with(options)
            .await?;

        tracing::info!(max_connections, "SQLite connection pool established");
        Ok(Self {
            pool,
            writer: Mutex::new(()),
        })
    }

    /// Get a reference to the connection pool (read path)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the schema
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        schema::migrate(&self.pool).await
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Wait for the writer lock, then open a transaction.
    ///
    /// Dropping the unit without [`WriteUnit::commit`] rolls everything back.
    pub async fn begin_write(&self) -> Result<WriteUnit<'_>, sqlx::Error> {
        let permit = self.writer.lock().await;
        let tx = self.pool.begin().await?;
        Ok(WriteUnit {
            tx,
            _permit: permit,
        })
    }

    /// Release the storage handle. Waits for the in-flight unit of work (if
    /// any) to commit or roll back before the connections are closed.
    pub async fn close(&self) {
        let _permit = self.writer.lock().await;
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed");
    }
}

/// One atomic unit of work. Field order matters: the transaction is dropped
/// (and rolled back) before the writer lock is released.
pub struct WriteUnit<'a> {
    tx: Transaction<'static, Sqlite>,
    _permit: MutexGuard<'a, ()>,
}

impl WriteUnit<'_> {
    /// Connection bound to this unit's transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
