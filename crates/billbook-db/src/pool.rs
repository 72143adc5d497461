//! # Database Handle
//!
//! Opens the SQLite file that holds the snapshot blob.
//!
//! ## Open Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig ──► connect options ──► SqlitePool ──► migrations ──► Database│
//! │                  │                                                      │
//! │                  ├── file:   WAL, NORMAL sync, busy timeout             │
//! │                  └── memory: one connection, never recycled             │
//! │                                                                         │
//! │  Database::snapshots() ──► SnapshotRepository (load / save / clear)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A command-line process does one read and at most one write, so the pool
//! stays small. Two processes writing the same file is last-writer-wins;
//! the busy timeout only makes the second writer wait instead of failing.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::SnapshotRepository;

const MEMORY_URL: &str = "sqlite::memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where and how to open the database.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/home/ravi/.local/share/billbook/billbook.db")
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; `None` means a private in-memory database.
    pub path: Option<PathBuf>,

    /// Default: 2
    pub max_connections: u32,

    /// How long a write waits for another process's lock. Default: 5s
    pub busy_timeout: Duration,

    /// How long to wait for a free pooled connection. Default: 10s
    pub acquire_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub migrate: bool,
}

impl DbConfig {
    /// A file-backed database. The file is created if missing; its
    /// directory must already exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
            max_connections: 2,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            migrate: true,
        }
    }

    /// A throwaway database living in a single connection.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            max_connections: 1,
            busy_timeout: Duration::ZERO,
            acquire_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        match &self.path {
            Some(path) => Ok(SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                // may lose the last save on power loss, never corrupts the file
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(self.busy_timeout)),
            None => SqliteConnectOptions::from_str(MEMORY_URL)
                .map_err(|e| DbError::ConnectionFailed(e.to_string())),
        }
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout);

        if self.is_in_memory() {
            // closing the only connection would drop every table
            options.min_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options
        }
    }

    fn describe(&self) -> String {
        self.path
            .as_deref()
            .map(Path::display)
            .map(|p| p.to_string())
            .unwrap_or_else(|| MEMORY_URL.to_string())
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open database. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) and migrates the database.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let target = config.describe();
        info!(path = %target, "Opening database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", target, e)))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.migrate {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Access to the stored snapshot.
    ///
    /// ```rust,ignore
    /// let snapshot = db.snapshots().load().await?;
    /// ```
    pub fn snapshots(&self) -> SnapshotRepository {
        SnapshotRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later queries fail.
    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }

    /// Whether a trivial query still succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
