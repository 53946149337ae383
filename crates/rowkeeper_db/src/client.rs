//! Database client for Rowkeeper
//!
//! This module provides a database client that is designed to be database agnostic,
//! using SQLx as the underlying database library. Entity providers use it as
//! their session.

use crate::dialect::Dialect;
use crate::error::DbError;
use rowkeeper_config::{AppConfig, DatabaseConfig};
use sqlx::pool::PoolOptions;
use sqlx::{Pool, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, sqlx::Any>;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Database client for Rowkeeper
///
/// Wraps a connection pool and remembers the SQL dialect of the backend it
/// is connected to.
#[derive(Debug, Clone)]
pub struct DbClient {
    /// The database connection pool
    pool: Pool<sqlx::Any>,
    /// Dialect derived from the connection URL
    dialect: Dialect,
}

impl DbClient {
    /// Create a new database client
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database configuration is missing
    /// * The database URL is missing
    /// * The database connection fails
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a new database client from a database configuration
    ///
    /// Pool size and timeouts fall back to 5 connections, 3 seconds acquire
    /// timeout and 600 seconds idle timeout.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is missing or has an unsupported scheme
    /// * The database connection fails
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        let db_url = &db_config.url;
        if db_url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }

        let pool_options = PoolOptions::new()
            .max_connections(db_config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .acquire_timeout(Duration::from_secs(
                db_config
                    .acquire_timeout_secs
                    .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            ))
            .idle_timeout(Duration::from_secs(
                db_config
                    .idle_timeout_secs
                    .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS),
            ));

        Self::connect(db_url, pool_options).await
    }

    /// Create a new database client from a database URL with default pool settings
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The database URL is empty, invalid or has an unsupported scheme
    /// * The database connection fails
    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }

        Self::from_config(&DatabaseConfig {
            url: db_url.to_string(),
            ..Default::default()
        })
        .await
    }

    async fn connect(db_url: &str, pool_options: PoolOptions<sqlx::Any>) -> Result<Self, DbError> {
        let dialect = Dialect::from_url(db_url)?;
        let pool = Self::create_pool(db_url, dialect, pool_options).await?;
        Ok(Self { pool, dialect })
    }

    /// Create a connection pool
    async fn create_pool(
        db_url: &str,
        dialect: Dialect,
        pool_options: PoolOptions<sqlx::Any>,
    ) -> Result<Pool<sqlx::Any>, DbError> {
        debug!("Creating {} database pool with URL: {}", dialect, db_url);

        // Register the drivers compiled in through the sqlite/postgres/mysql features
        sqlx::any::install_default_drivers();

        if dialect == Dialect::Sqlite {
            ensure_sqlite_file(db_url)?;
        }

        let pool = pool_options
            .connect_with(sqlx::any::AnyConnectOptions::from_str(db_url)?)
            .await
            .map_err(|e| {
                error!("Failed to create database pool: {}", e);
                DbError::PoolError(e.to_string())
            })?;

        info!("Database pool created successfully");
        Ok(pool)
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &Pool<sqlx::Any> {
        &self.pool
    }

    /// Get the SQL dialect of the connected database
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Begin a transaction
    ///
    /// # Errors
    ///
    /// This function will return an error if the transaction cannot be started
    pub async fn begin(&self) -> Result<DbTransaction<'_>, DbError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }

    /// Execute a query that returns no rows
    ///
    /// Returns the number of rows affected.
    pub async fn execute(&self, query: &str) -> Result<u64, DbError> {
        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Check if the database is healthy by executing a simple query.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl std::fmt::Display for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DbClient({})", self.dialect)
    }
}

/// Path of the database file named by a SQLite URL, or `None` for in-memory databases.
///
/// Handles both "sqlite:example.db" and "sqlite://example.db" and drops any
/// "?mode=..." query string.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") || path.starts_with("file:") {
        return None;
    }
    Some(path)
}

/// The `Any` driver cannot set create_if_missing, so create the directory and
/// an empty file up front.
fn ensure_sqlite_file(db_url: &str) -> Result<(), DbError> {
    let Some(db_path) = sqlite_file_path(db_url) else {
        return Ok(());
    };
    let path = Path::new(db_path);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating directory for SQLite database: {:?}", dir);
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory for SQLite database: {}", e);
                DbError::PoolError(format!("Failed to create directory: {}", e))
            })?;
        }
    }

    if !path.exists() {
        debug!("Creating empty SQLite database file: {}", db_path);
        std::fs::File::create(path).map_err(|e| {
            error!("Failed to create SQLite database file: {}", e);
            DbError::PoolError(format!("Failed to create database file: {}", e))
        })?;
    }
    Ok(())
}
