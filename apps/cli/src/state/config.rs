//! # Configuration State
//!
//! Stores CLI configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BILLBOOK_*`)
//! 2. Config file (`billbook.toml` in the platform config directory)
//! 3. Defaults (this file)
//!
//! The business profile (name, GSTIN, currency shown on invoices) is not
//! configuration: it lives in the snapshot and is edited with
//! `billbook settings set`.

use billbook_core::{Money, Settings, DEFAULT_DUE_DAYS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the optional config file.
pub const CONFIG_FILE: &str = "billbook.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE: &str = "billbook.db";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// CLI configuration.
///
/// ## Example `billbook.toml`
/// ```toml
/// db_path = "/srv/billbook/billbook.db"
/// backup_dir = "/srv/billbook/backups"
/// due_days = 30
/// currency = "Rs."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Where `backup export` writes when no directory is given.
    /// Default: current directory
    pub backup_dir: PathBuf,

    /// Days until a new invoice falls due.
    /// Default: 15
    pub due_days: u64,

    /// Currency symbol override for display.
    /// Default: none (use the business settings)
    pub currency: Option<String>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            db_path: None,
            backup_dir: PathBuf::from("."),
            due_days: DEFAULT_DUE_DAYS,
            currency: None,
        }
    }
}

impl ConfigState {
    /// Loads configuration from the config file and the environment.
    ///
    /// A missing config file is not an error; an unreadable or invalid one
    /// is logged and ignored so the CLI still starts.
    pub fn load() -> Self {
        let base = match config_file_path() {
            Some(path) if path.exists() => match ConfigState::from_file(&path) {
                Ok(config) => {
                    debug!(path = %path.display(), "Config file loaded");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring config file");
                    ConfigState::default()
                }
            },
            _ => ConfigState::default(),
        };

        base.with_env(|key| std::env::var(key).ok())
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides.
    ///
    /// ## Environment Variables
    /// - `BILLBOOK_DB_PATH`: database file
    /// - `BILLBOOK_BACKUP_DIR`: default export directory
    /// - `BILLBOOK_DUE_DAYS`: days until due for new invoices
    /// - `BILLBOOK_CURRENCY`: currency symbol for display
    ///
    /// Empty values are ignored, as is a non-numeric `BILLBOOK_DUE_DAYS`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var("BILLBOOK_DB_PATH") {
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = var("BILLBOOK_BACKUP_DIR") {
            self.backup_dir = PathBuf::from(dir);
        }

        if let Some(days) = var("BILLBOOK_DUE_DAYS") {
            match days.trim().parse() {
                Ok(days) => self.due_days = days,
                Err(_) => warn!(value = %days, "Ignoring invalid BILLBOOK_DUE_DAYS"),
            }
        }

        if let Some(symbol) = var("BILLBOOK_CURRENCY") {
            self.currency = Some(symbol);
        }

        self
    }

    /// Resolves the database file path.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.billbook.billbook/billbook.db`
    /// - **Windows**: `%APPDATA%\billbook\billbook\data\billbook.db`
    /// - **Linux**: `~/.local/share/billbook/billbook.db`
    ///
    /// The data directory is created if missing.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let proj_dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = proj_dirs.data_dir();

        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::CreateDir {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE))
    }

    /// Currency symbol to display: the override, else the business
    /// settings, else `₹`.
    pub fn currency_symbol<'a>(&'a self, settings: &'a Settings) -> &'a str {
        match &self.currency {
            Some(symbol) => symbol.as_str(),
            None if !settings.currency.trim().is_empty() => settings.currency.as_str(),
            None => "₹",
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "billbook", "billbook")
}

/// Location of `billbook.toml`; `BILLBOOK_CONFIG` overrides it.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("BILLBOOK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Formats an amount with Indian digit grouping.
///
/// ## Example
/// ```rust,ignore
/// assert_eq!(format_currency("₹", Money::from_minor(12_345_600)), "₹1,23,456.00");
/// ```
///
/// The symbol always comes first, so negatives read `₹-500.00`.
pub fn format_currency(symbol: &str, amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let abs = amount.abs();

    format!(
        "{}{}{}.{:02}",
        symbol,
        sign,
        group_indian(abs.major().unsigned_abs()),
        abs.minor_part().unsigned_abs()
    )
}

/// `1234567` → `12,34,567`: the last three digits, then groups of two.
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency_grouping() {
        assert_eq!(format_currency("₹", Money::from_minor(0)), "₹0.00");
        assert_eq!(format_currency("₹", Money::from_minor(99_950)), "₹999.50");
        assert_eq!(format_currency("₹", Money::from_minor(123_400)), "₹1,234.00");
        assert_eq!(format_currency("₹", Money::from_minor(12_345_600)), "₹1,23,456.00");
        assert_eq!(format_currency("₹", Money::from_minor(123_456_789)), "₹12,34,567.89");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency("₹", Money::from_minor(-50_000)), "₹-500.00");
        assert_eq!(format_currency("Rs.", Money::from_minor(-5)), "Rs.-0.05");
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigState::default().with_env(env(&[
            ("BILLBOOK_DB_PATH", "/tmp/books.db"),
            ("BILLBOOK_BACKUP_DIR", "/tmp/backups"),
            ("BILLBOOK_DUE_DAYS", "30"),
            ("BILLBOOK_CURRENCY", "$"),
        ]));

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/books.db")));
        assert_eq!(config.backup_dir, PathBuf::from("/tmp/backups"));
        assert_eq!(config.due_days, 30);
        assert_eq!(config.currency.as_deref(), Some("$"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/books.db"));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let config = ConfigState::default().with_env(env(&[
            ("BILLBOOK_DUE_DAYS", "soon"),
            ("BILLBOOK_CURRENCY", "  "),
        ]));
        assert_eq!(config, ConfigState::default());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "due_days = 7\nbackup_dir = \"/srv/backups\"\n").unwrap();

        let config = ConfigState::from_file(&path).unwrap();
        assert_eq!(config.due_days, 7);
        assert_eq!(config.backup_dir, PathBuf::from("/srv/backups"));
        assert_eq!(config.db_path, None);

        std::fs::write(&path, "due_days = \"seven\"").unwrap();
        assert!(matches!(
            ConfigState::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_currency_symbol_precedence() {
        let mut settings = Settings::default();
        let config = ConfigState::default();
        assert_eq!(config.currency_symbol(&settings), "₹");

        settings.currency = "Rs.".to_string();
        assert_eq!(config.currency_symbol(&settings), "Rs.");

        settings.currency = String::new();
        assert_eq!(config.currency_symbol(&settings), "₹");

        let config = ConfigState {
            currency: Some("$".to_string()),
            ..ConfigState::default()
        };
        assert_eq!(config.currency_symbol(&settings), "$");
    }
}
