use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;

/// A single storage handle: the sea-orm connection plus the raw sqlx pool
/// backing it, kept so the handle can be closed explicitly.
#[derive(Clone)]
pub struct StorageHandle {
    pub db: DatabaseConnection,
    raw: SqlitePool,
}

impl StorageHandle {
    pub async fn close(&self) {
        self.raw.close().await;
    }
}

/// Open one handle configured for concurrent access to the database file:
/// WAL journal, relaxed fsync, in-memory temp tables.
pub async fn open_handle(config: &DatabaseConfig) -> AppResult<StorageHandle> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(config.connect_timeout());

    // one physical connection per handle; the pool above does the multiplexing
    let raw = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    sqlx::query("PRAGMA temp_store = MEMORY;")
        .execute(&raw)
        .await?;

    Ok(StorageHandle {
        db: SqlxSqliteConnector::from_sqlx_sqlite_pool(raw.clone()),
        raw,
    })
}

pub async fn run_migrations(db: &DatabaseConnection) -> AppResult<()> {
    Migrator::up(db, None).await?;
    Ok(())
}
