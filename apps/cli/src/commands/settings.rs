//! # Settings Commands
//!
//! The business profile printed on invoices, plus a diagnostics view of
//! where data lives and how much of it there is.

use billbook_core::invoice::{duplicate_numbers, DuplicateNumber};
use billbook_core::reports::{data_stats, DataStats};
use billbook_core::{repository, Settings};
use billbook_db::migrations::migration_status;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

use super::{or_dash, Output};
use crate::error::{ApiError, ApiResult};
use crate::state::{config_file_path, ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the business profile, storage locations and record counts
    Show,
    /// Update the business profile (only the given fields change)
    Set(SettingsFields),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SettingsFields {
    #[arg(long)]
    pub business_name: Option<String>,
    /// GSTIN
    #[arg(long)]
    pub gst: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Currency symbol, e.g. ₹ or $
    #[arg(long)]
    pub currency: Option<String>,
    /// Preferred invoice prefix (stored only; numbers stay INV-/PUR-)
    #[arg(long)]
    pub invoice_prefix: Option<String>,
}

impl SettingsFields {
    fn is_empty(&self) -> bool {
        self.business_name.is_none()
            && self.gst.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.email.is_none()
            && self.currency.is_none()
            && self.invoice_prefix.is_none()
    }

    fn apply(self, settings: &mut Settings) {
        if let Some(name) = self.business_name {
            settings.business_name = name;
        }
        if let Some(gst) = self.gst {
            settings.tax_id = gst;
        }
        if let Some(phone) = self.phone {
            settings.phone = phone;
        }
        if let Some(address) = self.address {
            settings.address = address;
        }
        if let Some(email) = self.email {
            settings.email = email;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        if let Some(prefix) = self.invoice_prefix {
            settings.invoice_prefix = prefix;
        }
    }
}

/// Everything `settings show` reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView<'a> {
    settings: &'a Settings,
    stats: DataStats,
    duplicate_numbers: Vec<DuplicateNumber>,
    database: DatabaseInfo,
    config_file: Option<PathBuf>,
    backup_dir: &'a PathBuf,
    due_days: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DatabaseInfo {
    path: Option<PathBuf>,
    healthy: bool,
    migrations_total: usize,
    migrations_applied: usize,
    last_saved: Option<String>,
}

pub async fn run(cmd: SettingsCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        SettingsCommand::Show => show(db, config).await,
        SettingsCommand::Set(fields) => {
            if fields.is_empty() {
                return Err(ApiError::validation("Nothing to update; pass at least one field"));
            }

            let mut settings = db.snapshot().settings.clone();
            fields.apply(&mut settings);
            let next = repository::update_settings(db.snapshot(), settings);
            let saved = db.commit(next).await;

            info!("Settings updated");
            Ok(Output::message("Settings saved").persisted(saved))
        }
    }
}

async fn show(db: &DbState, config: &ConfigState) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let pool = db.inner().pool();

    let (migrations_total, migrations_applied) = migration_status(pool).await?;
    let database = DatabaseInfo {
        path: config.database_path().ok(),
        healthy: db.inner().health_check().await,
        migrations_total,
        migrations_applied,
        last_saved: db.inner().snapshots().last_saved().await?,
    };

    let view = SettingsView {
        settings: &snapshot.settings,
        stats: data_stats(snapshot),
        duplicate_numbers: duplicate_numbers(snapshot),
        database,
        config_file: config_file_path(),
        backup_dir: &config.backup_dir,
        due_days: config.due_days,
    };

    let s = view.settings;
    let mut text = String::new();
    let _ = writeln!(text, "Business name   {}", or_dash(&s.business_name));
    let _ = writeln!(text, "GSTIN           {}", or_dash(&s.tax_id));
    let _ = writeln!(text, "Phone           {}", or_dash(&s.phone));
    let _ = writeln!(text, "Email           {}", or_dash(&s.email));
    let _ = writeln!(text, "Address         {}", or_dash(&s.address));
    let _ = writeln!(text, "Currency        {}", config.currency_symbol(s));
    let _ = writeln!(text, "Invoice prefix  {}", or_dash(&s.invoice_prefix));
    let _ = writeln!(text);

    let db_info = &view.database;
    let _ = writeln!(
        text,
        "Database        {}",
        db_info
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "—".to_string())
    );
    let _ = writeln!(
        text,
        "                {} · migrations {}/{} · last saved {}",
        if db_info.healthy { "ok" } else { "unreachable" },
        db_info.migrations_applied,
        db_info.migrations_total,
        db_info.last_saved.as_deref().unwrap_or("never")
    );
    let _ = writeln!(
        text,
        "Config file     {}",
        view.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "—".to_string())
    );
    let _ = writeln!(text, "Backups         {}", view.backup_dir.display());
    let _ = writeln!(text, "Due in          {} days", view.due_days);
    let _ = writeln!(text);

    let stats = view.stats;
    let _ = write!(
        text,
        "{} invoice(s) · {} customer(s) · {} product(s) · {} expense(s)",
        stats.invoices, stats.customers, stats.products, stats.expenses
    );
    for dup in &view.duplicate_numbers {
        let _ = write!(
            text,
            "\nwarning: {} {} is used by {} records",
            dup.kind.label(),
            dup.number,
            dup.count
        );
    }

    Output::data(text, &view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use billbook_db::{Database, DbConfig};

    async fn state() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DbState::open(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_changes_only_given_fields() {
        let mut db = state().await;
        let fields = SettingsFields {
            business_name: Some("Sharma Traders".into()),
            gst: Some("29ABCDE1234F1Z5".into()),
            ..SettingsFields::default()
        };
        run(SettingsCommand::Set(fields), &mut db, &ConfigState::default())
            .await
            .unwrap();

        let settings = &db.snapshot().settings;
        assert_eq!(settings.business_name, "Sharma Traders");
        assert_eq!(settings.tax_id, "29ABCDE1234F1Z5");
        assert_eq!(settings.currency, "₹");
    }

    #[tokio::test]
    async fn test_set_without_fields_is_rejected() {
        let mut db = state().await;
        let err = run(
            SettingsCommand::Set(SettingsFields::default()),
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_show_reports_storage_and_counts() {
        let mut db = state().await;
        let fields = SettingsFields {
            currency: Some("$".into()),
            ..SettingsFields::default()
        };
        run(SettingsCommand::Set(fields), &mut db, &ConfigState::default())
            .await
            .unwrap();

        let config = ConfigState {
            db_path: Some(PathBuf::from("books.db")),
            ..ConfigState::default()
        };
        let out = run(SettingsCommand::Show, &mut db, &config).await.unwrap();
        let text = out.text();
        assert!(text.contains("Business name   My Business"));
        assert!(text.contains("Currency        $"));
        assert!(text.contains("0 invoice(s)"));
        assert!(!text.contains("last saved never"));

        let json = match out {
            Output::Data { json, .. } => json,
            Output::Message(_) => panic!("expected data"),
        };
        assert_eq!(json["database"]["healthy"], true);
        assert_eq!(json["database"]["path"], "books.db");
        assert_eq!(json["settings"]["currency"], "$");
        assert_eq!(json["dueDays"], 15);
    }
}
