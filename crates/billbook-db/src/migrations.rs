//! # Schema Migrations
//!
//! The schema is one table, `kv_store`, but it is still created through
//! embedded sqlx migrations so later changes have a place to go.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  build:  sqlx::migrate!("./migrations") embeds NNNN_name.sql files      │
//! │  open:   Database::new ──► run_migrations ──► _sqlx_migrations updated  │
//! │  show:   settings show ──► migration_status ──► "migrations 1/1"        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applied files are checksummed by sqlx; edit history by adding a new
//! file, never by changing an old one.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies whatever has not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let (total, before) = migration_status(pool).await?;
    if before >= total {
        debug!(total, "Schema up to date");
        return Ok(());
    }

    MIGRATOR.run(pool).await?;
    info!(applied = total - before, total, "Schema migrated");
    Ok(())
}

/// `(embedded, applied)` migration counts.
///
/// A database that has never been migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let has_table: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;
    if !has_table {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;
    Ok((total, applied as usize))
}
