//! # Snapshot Repository
//!
//! Stores the whole [`Snapshot`] as one JSON blob in the `kv_store` table.
//!
//! ## Load / Save
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load():  SELECT value ──► no row?        ──► Snapshot::default()       │
//! │                        ──► unparsable?    ──► warn!, Snapshot::default()│
//! │                        ──► JSON           ──► lenient decode            │
//! │                                                                         │
//! │  save():  serde_json ──► INSERT ... ON CONFLICT(key) DO UPDATE          │
//! │                                                                         │
//! │  clear(): DELETE the row (next load() starts empty)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::Snapshot;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;

/// Storage key of the snapshot blob. The suffix versions the format.
pub const SNAPSHOT_KEY: &str = "billbook_data_v1";

/// Repository for the snapshot blob.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.snapshots();
///
/// let snapshot = repo.load().await?;
/// repo.save(&snapshot).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Loads the stored snapshot.
    ///
    /// A missing row or an unparsable blob yields the default snapshot
    /// (empty collections, default settings). Only a failing database is an
    /// error.
    pub async fn load(&self) -> DbResult<Snapshot> {
        let row: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await?;

        let Some(blob) = row else {
            debug!("No stored snapshot, starting empty");
            return Ok(Snapshot::default());
        };

        match serde_json::from_str::<Snapshot>(&blob) {
            Ok(snapshot) => {
                info!(
                    invoices = snapshot.invoices.len(),
                    customers = snapshot.customers.len(),
                    products = snapshot.products.len(),
                    expenses = snapshot.expenses.len(),
                    "Snapshot loaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, bytes = blob.len(), "Stored snapshot is unreadable, starting empty");
                Ok(Snapshot::default())
            }
        }
    }

    /// Writes the snapshot, replacing any stored one.
    pub async fn save(&self, snapshot: &Snapshot) -> DbResult<()> {
        let blob = serde_json::to_string(snapshot)?;

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SNAPSHOT_KEY)
        .bind(&blob)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(bytes = blob.len(), "Snapshot saved");
        Ok(())
    }

    /// Deletes the stored snapshot. Returns whether a row existed.
    pub async fn clear(&self) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .execute(&self.pool)
            .await?;

        info!(existed = result.rows_affected() > 0, "Stored snapshot cleared");
        Ok(result.rows_affected() > 0)
    }

    /// When the snapshot was last saved (RFC 3339), if ever.
    pub async fn last_saved(&self) -> DbResult<Option<String>> {
        let updated_at = sqlx::query_scalar("SELECT updated_at FROM kv_store WHERE key = ?1")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated_at)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
