//! # Backup Format
//!
//! A backup file is the serialized snapshot verbatim:
//!
//! ```text
//! { "invoices": [...], "customers": [...], "products": [...],
//!   "expenses": [...], "settings": {...} }
//! ```
//!
//! This module only turns text into a checked [`Snapshot`]. Reading and
//! writing the file lives in `billbook-db`.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::Snapshot;

/// File name prefix for exported backups.
pub const BACKUP_FILE_PREFIX: &str = "billbook-backup";

/// `billbook-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{}-{}.json", BACKUP_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Parses backup text into a snapshot.
///
/// ## Rules
/// - Not JSON → [`CoreError::BackupParse`]
/// - JSON without array-valued `invoices` and `customers` → [`CoreError::InvalidBackup`]
/// - Missing `products`, `expenses` or `settings` take their defaults
///
/// ## Example
/// ```rust
/// use billbook_core::backup::from_backup_json;
///
/// let snapshot = from_backup_json(r#"{ "invoices": [], "customers": [] }"#).unwrap();
/// assert!(snapshot.products.is_empty());
/// assert_eq!(snapshot.settings.business_name, "My Business");
///
/// assert!(from_backup_json(r#"{ "invoices": [] }"#).is_err());
/// assert!(from_backup_json("not json").is_err());
/// ```
pub fn from_backup_json(text: &str) -> CoreResult<Snapshot> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CoreError::BackupParse(e.to_string()))?;

    let has_list = |key: &str| value.get(key).map_or(false, Value::is_array);
    if !has_list("invoices") || !has_list("customers") {
        return Err(CoreError::InvalidBackup(
            "expected `invoices` and `customers` lists".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| CoreError::InvalidBackup(e.to_string()))
}
