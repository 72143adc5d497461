//! # Database State
//!
//! Wraps the `Database` handle together with the live snapshot.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command ──► billbook-core op(&snapshot) ──► Commit { snapshot, record }│
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                                   DbState::commit(next)                 │
//! │                                      │            │                     │
//! │                              save ok │            │ save failed         │
//! │                                      ▼            ▼                     │
//! │                              replace snapshot   warn!, still replace    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed save never undoes a change: the in-memory snapshot stays
//! authoritative and the failure is reported as a warning.

use billbook_core::Snapshot;
use billbook_db::{Database, DbResult};
use tracing::{debug, warn};

/// The database plus the snapshot every command reads from.
#[derive(Debug)]
pub struct DbState {
    db: Database,
    snapshot: Snapshot,
}

impl DbState {
    /// Loads the stored snapshot and wraps the database.
    pub async fn open(db: Database) -> DbResult<Self> {
        let snapshot = db.snapshots().load().await?;
        Ok(DbState { db, snapshot })
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Persists `next` and makes it current.
    ///
    /// Returns whether the save succeeded. A `false` must reach the user:
    /// the in-memory snapshot dies with the process.
    #[must_use = "a failed save must be reported to the user"]
    pub async fn commit(&mut self, next: Snapshot) -> bool {
        let saved = match self.db.snapshots().save(&next).await {
            Ok(()) => {
                debug!("Snapshot committed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not save data; the change is kept in memory only");
                false
            }
        };
        self.snapshot = next;
        saved
    }

    /// Deletes the stored snapshot and resets to an empty one.
    pub async fn clear(&mut self) -> DbResult<bool> {
        let existed = self.db.snapshots().clear().await?;
        self.snapshot = Snapshot::default();
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::{repository, Customer};
    use billbook_db::DbConfig;

    async fn state() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DbState::open(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let mut state = state().await;
        let next = repository::create(state.snapshot(), Customer::new("Acme"))
            .unwrap()
            .snapshot;

        assert!(state.commit(next.clone()).await);
        assert_eq!(state.snapshot(), &next);
        assert_eq!(state.inner().snapshots().load().await.unwrap(), next);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_change_in_memory() {
        let mut state = state().await;
        state.inner().close().await;

        let next = repository::create(state.snapshot(), Customer::new("Acme"))
            .unwrap()
            .snapshot;

        assert!(!state.commit(next.clone()).await);
        assert_eq!(state.snapshot(), &next);
    }

    #[tokio::test]
    async fn test_clear_resets_snapshot() {
        let mut state = state().await;
        let next = repository::create(state.snapshot(), Customer::new("Acme"))
            .unwrap()
            .snapshot;
        assert!(state.commit(next).await);

        assert!(state.clear().await.unwrap());
        assert_eq!(state.snapshot(), &Snapshot::default());
    }
}
