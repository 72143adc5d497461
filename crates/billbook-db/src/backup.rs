//! # Backup Files
//!
//! Export and import of the snapshot as a pretty-printed JSON file.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  export: Snapshot ──► to_string_pretty ──► <dir>/billbook-backup-<date>.json
//! │                                                                         │
//! │  import: file ──► from_backup_json (billbook-core) ──► Snapshot        │
//! │                         │                                               │
//! │                         └── Err: caller keeps its current snapshot      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Import never touches the database; the caller decides whether to save
//! the returned snapshot.

use billbook_core::backup::{backup_file_name, from_backup_json};
use billbook_core::Snapshot;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::DbResult;

/// Writes `billbook-backup-YYYY-MM-DD.json` into `dir` and returns its path.
///
/// An existing backup from the same day is overwritten.
pub async fn export_backup(snapshot: &Snapshot, dir: &Path, date: NaiveDate) -> DbResult<PathBuf> {
    let path = dir.join(backup_file_name(date));
    let json = serde_json::to_string_pretty(snapshot)?;

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, json.as_bytes()).await?;

    info!(path = %path.display(), bytes = json.len(), "Backup written");
    Ok(path)
}

/// Reads and validates a backup file.
pub async fn import_backup(path: &Path) -> DbResult<Snapshot> {
    let text = tokio::fs::read_to_string(path).await?;
    let snapshot = from_backup_json(&text)?;

    info!(
        path = %path.display(),
        invoices = snapshot.invoices.len(),
        customers = snapshot.customers.len(),
        "Backup read"
    );
    Ok(snapshot)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use billbook_core::invoice::{new_invoice, save_invoice};
    use billbook_core::repository;
    use billbook_core::{
        CoreError, Customer, Expense, ExpenseCategory, InvoiceKind, Money, Product, Settings, TaxRate,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn populated() -> Snapshot {
        let mut snapshot = repository::update_settings(
            &Snapshot::default(),
            Settings {
                business_name: "Sharma Stores".to_string(),
                tax_id: "27AAACS1234A1Z1".to_string(),
                ..Settings::default()
            },
        );
        snapshot = repository::create(&snapshot, Customer::new("Acme")).unwrap().snapshot;
        snapshot = repository::create(
            &snapshot,
            Product::new("Notebook", Money::from_minor(4_550), TaxRate::from_percentage(12.0)),
        )
        .unwrap()
        .snapshot;
        snapshot = repository::create(
            &snapshot,
            Expense::new(date(2024, 4, 2), ExpenseCategory::Utilities, Money::from_minor(1_999)),
        )
        .unwrap()
        .snapshot;

        let mut invoice = new_invoice(&snapshot, InvoiceKind::Sale, date(2024, 4, 3));
        invoice.customer = "Acme".to_string();
        invoice.items[0].description = "Notebook".to_string();
        invoice.items[0].quantity = 3.0;
        invoice.items[0].price = Money::from_minor(4_550);
        save_invoice(&snapshot, invoice, None).unwrap().snapshot
    }

    #[tokio::test]
    async fn test_export_then_import_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = populated();

        let path = export_backup(&snapshot, dir.path(), date(2024, 4, 5)).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "billbook-backup-2024-04-05.json");

        let restored = import_backup(&path).await.unwrap();
        assert_eq!(restored, snapshot);
    }

    #[tokio::test]
    async fn test_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("backups").join("2024");

        let path = export_backup(&Snapshot::default(), &nested, date(2024, 1, 1)).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.json");
        tokio::fs::write(&garbage, "{ not json").await.unwrap();
        assert!(matches!(
            import_backup(&garbage).await,
            Err(DbError::Core(CoreError::BackupParse(_)))
        ));

        let wrong_shape = dir.path().join("wrong.json");
        tokio::fs::write(&wrong_shape, r#"{ "products": [] }"#).await.unwrap();
        assert!(matches!(
            import_backup(&wrong_shape).await,
            Err(DbError::Core(CoreError::InvalidBackup(_)))
        ));

        assert!(matches!(
            import_backup(&dir.path().join("missing.json")).await,
            Err(DbError::Io(_))
        ));
    }
}
