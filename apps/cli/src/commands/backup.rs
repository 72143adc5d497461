//! # Backup Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  backup export [DIR] ──► <DIR>/billbook-backup-YYYY-MM-DD.json          │
//! │                                                                         │
//! │  backup import FILE --yes                                               │
//! │        │                                                                │
//! │        ├── invalid ──► BACKUP_ERROR, current data untouched             │
//! │        └── valid   ──► replaces ALL data, then saved                    │
//! │                                                                         │
//! │  clear --yes ──► deletes the stored snapshot                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::reports::data_stats;
use billbook_db::{export_backup, import_backup};
use chrono::Local;
use clap::Subcommand;
use std::path::PathBuf;
use tracing::{info, warn};

use super::{require_yes, Output};
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write all data to a dated JSON file
    Export {
        /// Target directory (default: the configured backup directory)
        dir: Option<PathBuf>,
    },
    /// Replace all data with the contents of a backup file
    Import {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(cmd: BackupCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        BackupCommand::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.backup_dir.clone());
            let today = Local::now().date_naive();
            let path = export_backup(db.snapshot(), &dir, today).await?;
            Ok(Output::message(format!("Backup written to {}", path.display())))
        }
        BackupCommand::Import { file, yes } => {
            require_yes(yes, "replace all data from a backup")?;

            let imported = import_backup(&file).await?;
            let stats = data_stats(&imported);
            let saved = db.commit(imported).await;

            info!(path = %file.display(), saved, "Backup imported");
            Ok(Output::message(format!(
                "Imported {} invoice(s), {} customer(s), {} product(s), {} expense(s)",
                stats.invoices, stats.customers, stats.products, stats.expenses
            ))
            .persisted(saved))
        }
    }
}

/// Deletes every record.
pub async fn clear(db: &mut DbState, yes: bool) -> ApiResult<Output> {
    require_yes(yes, "clear all data")?;

    let existed = db.clear().await?;
    if !existed {
        warn!("Nothing was stored; data was already empty");
    }
    Ok(Output::message("All data cleared"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use billbook_core::{repository, Customer};
    use billbook_db::{Database, DbConfig};

    async fn state() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DbState::open(db).await.unwrap()
    }

    async fn with_customer(db: &mut DbState, name: &str) {
        let next = repository::create(db.snapshot(), Customer::new(name))
            .unwrap()
            .snapshot;
        assert!(db.commit(next).await);
    }

    #[tokio::test]
    async fn test_export_then_import_replaces_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = state().await;
        with_customer(&mut source, "Acme").await;

        let out = run(
            BackupCommand::Export { dir: Some(dir.path().to_path_buf()) },
            &mut source,
            &ConfigState::default(),
        )
        .await
        .unwrap();
        assert!(out.text().starts_with("Backup written to"));

        let file = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        assert!(file.file_name().unwrap().to_string_lossy().starts_with("billbook-backup-"));

        let mut target = state().await;
        with_customer(&mut target, "Someone Else").await;

        let out = run(
            BackupCommand::Import { file, yes: true },
            &mut target,
            &ConfigState::default(),
        )
        .await
        .unwrap();
        assert!(out.text().contains("1 customer(s)"));
        assert_eq!(target.snapshot().customers.len(), 1);
        assert_eq!(target.snapshot().customers[0].name, "Acme");

        let reloaded = target.inner().snapshots().load().await.unwrap();
        assert_eq!(&reloaded, target.snapshot());
    }

    #[tokio::test]
    async fn test_invalid_backup_keeps_current_data() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, r#"{"customers": []}"#).unwrap();

        let mut db = state().await;
        with_customer(&mut db, "Acme").await;

        let err = run(BackupCommand::Import { file, yes: true }, &mut db, &ConfigState::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackupError);
        assert_eq!(db.snapshot().customers[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_import_needs_yes() {
        let mut db = state().await;
        let err = run(
            BackupCommand::Import { file: PathBuf::from("missing.json"), yes: false },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);
    }

    #[tokio::test]
    async fn test_clear() {
        let mut db = state().await;
        with_customer(&mut db, "Acme").await;

        let err = clear(&mut db, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);

        clear(&mut db, true).await.unwrap();
        assert!(db.snapshot().customers.is_empty());
        assert!(db.inner().snapshots().load().await.unwrap().customers.is_empty());
    }
}
