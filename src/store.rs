//! Durable entity store.
//!
//! All authoritative state lives in SQLite. Referential actions (cascading
//! deletes), uniqueness, and the connection status check are declared in
//! `res/schema.sql` and enforced by the database, never by application code.
//! Every call that touches the pool goes through [`Store::timed`] so a stalled
//! database surfaces as [`AppError::Timeout`] instead of hanging a request.

use std::{future::Future, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::{debug, info, warn};

use crate::{AppError, AppResult, config::Config, res::SCHEMA};

#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    timeout: Duration,
}

impl Store {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.store_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.store_timeout)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            timeout: config.store_timeout,
        };
        store.apply_schema().await?;

        info!(url = %config.database_url, "store ready");
        Ok(store)
    }

    async fn apply_schema(&self) -> AppResult<()> {
        self.timed(sqlx::raw_sql(SCHEMA).execute(&self.pool)).await?;
        debug!("schema applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs one store interaction under the store timeout.
    pub async fn timed<T, E, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AppError: From<E>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "store operation timed out");
                Err(AppError::Timeout)
            }
        }
    }

    /// Cheap liveness probe used by `/health`.
    pub async fn ping(&self) -> AppResult<()> {
        self.timed(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn is_unique_violation(err: &AppError) -> bool {
    matches!(err, AppError::Database(sqlx::Error::Database(e)) if e.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &AppError) -> bool {
    matches!(err, AppError::Database(sqlx::Error::Database(e)) if e.is_foreign_key_violation())
}
