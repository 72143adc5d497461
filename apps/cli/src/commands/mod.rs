//! # Commands Module
//!
//! One module per command group.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (shared output helpers)
//! ├── customer.rs  ◄─── customer list/add/edit/delete
//! ├── product.rs   ◄─── product list/add/edit/delete/stock
//! ├── invoice.rs   ◄─── invoice list/new/edit/show/mark-paid/status/delete
//! ├── expense.rs   ◄─── expense list/add/edit/delete
//! ├── report.rs    ◄─── dashboard, report
//! ├── settings.rs  ◄─── settings show/set
//! └── backup.rs    ◄─── backup export/import, clear
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  billbook customer add "Acme" --phone 98450...                          │
//! │         │                                                               │
//! │         ▼ (clap)                                                        │
//! │  CustomerCommand::Add { .. }                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  customer::run(cmd, &mut DbState, &ConfigState) -> ApiResult<Output>    │
//! │         │                                                               │
//! │         │  billbook-core op ──► DbState::commit(next)                   │
//! │         ▼                                                               │
//! │  Output ──► table / text on stdout, or JSON with --json                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod backup;
pub mod customer;
pub mod expense;
pub mod invoice;
pub mod product;
pub mod report;
pub mod settings;

use billbook_core::{Money, Settings, TaxRate, TAX_RATES};
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::{format_currency, ConfigState};

// =============================================================================
// Output
// =============================================================================

/// Appended to the output of a command whose save failed.
pub const NOT_SAVED_WARNING: &str = "Warning: could not save; change not persisted";

/// What a command prints.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// A confirmation line; `--json` prints it as `{"message": ...}`.
    Message(String),

    /// Rendered text plus its structured form for `--json`.
    Data {
        text: String,
        json: serde_json::Value,
    },
}

impl Output {
    pub fn message(text: impl Into<String>) -> Self {
        Output::Message(text.into())
    }

    pub fn data(text: impl Into<String>, value: &impl Serialize) -> ApiResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| ApiError::internal(format!("Could not serialize output: {}", e)))?;
        Ok(Output::Data {
            text: text.into(),
            json,
        })
    }

    /// The text to print.
    pub fn render(&self, json: bool) -> String {
        match (self, json) {
            (Output::Message(text), false) | (Output::Data { text, .. }, false) => text.clone(),
            (Output::Message(text), true) => serde_json::json!({ "message": text }).to_string(),
            (Output::Data { json, .. }, true) => {
                serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
            }
        }
    }

    /// Adds a warning when the change could not be written to disk.
    ///
    /// ```rust,ignore
    /// let saved = db.commit(commit.snapshot).await;
    /// Ok(Output::message("Saved").persisted(saved))
    /// ```
    pub fn persisted(self, saved: bool) -> Self {
        if saved {
            return self;
        }
        match self {
            Output::Message(text) => Output::Message(format!("{}\n{}", text, NOT_SAVED_WARNING)),
            Output::Data { text, mut json } => {
                if let Some(object) = json.as_object_mut() {
                    object.insert("warning".into(), NOT_SAVED_WARNING.into());
                }
                Output::Data {
                    text: format!("{}\n{}", text, NOT_SAVED_WARNING),
                    json,
                }
            }
        }
    }

    /// The human-readable text, whatever the variant.
    pub fn text(&self) -> &str {
        match self {
            Output::Message(text) | Output::Data { text, .. } => text,
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats amounts with the configured currency symbol.
#[derive(Debug, Clone)]
pub struct Formatter {
    symbol: String,
}

impl Formatter {
    pub fn new(config: &ConfigState, settings: &Settings) -> Self {
        Formatter {
            symbol: config.currency_symbol(settings).to_string(),
        }
    }

    pub fn money(&self, amount: Money) -> String {
        format_currency(&self.symbol, amount)
    }
}

/// `05 Apr 2024`, or `—` when there is no date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => "—".to_string(),
    }
}

/// Empty strings print as `—`.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "—"
    } else {
        value
    }
}

/// A table with the shared look.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

/// Shortened id for tables; commands accept any unique prefix.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Destructive commands need `--yes`.
pub fn require_yes(yes: bool, action: &str) -> ApiResult<()> {
    if yes {
        Ok(())
    } else {
        Err(ApiError::confirmation_required(action))
    }
}

/// Resolves a full id from a unique prefix.
pub fn resolve_id<'a>(
    entity: &str,
    prefix: &str,
    ids: impl Iterator<Item = &'a str>,
) -> ApiResult<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(ApiError::validation(format!("{} id is required", entity)));
    }

    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(ApiError::not_found(entity, prefix)),
        many => match many.iter().find(|id| **id == prefix) {
            Some(id) => Ok(id.to_string()),
            None => Err(ApiError::validation(format!(
                "{} id '{}' is ambiguous ({} matches)",
                entity,
                prefix,
                many.len()
            ))),
        },
    }
}

// =============================================================================
// Argument Parsers
// =============================================================================

/// clap parser for amounts like `1250`, `1,250.50` or `₹99.9`.
pub fn parse_money(input: &str) -> Result<Money, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Money::parse(&cleaned).ok_or_else(|| format!("'{}' is not an amount", input))
}

/// clap parser for GST percentages like `18` or `5%`.
///
/// Only the slabs in [`TAX_RATES`] are accepted.
pub fn parse_tax(input: &str) -> Result<TaxRate, String> {
    let pct: f64 = input
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{}' is not a tax percentage", input))?;
    if !TAX_RATES.iter().any(|&rate| f64::from(rate) == pct) {
        let allowed: Vec<String> = TAX_RATES.iter().map(u32::to_string).collect();
        return Err(format!("GST rate must be one of {}, not '{}'", allowed.join(", "), input));
    }
    Ok(TaxRate::from_percentage(pct))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("1250").unwrap(), Money::from_minor(125_000));
        assert_eq!(parse_money("1,250.50").unwrap(), Money::from_minor(125_050));
        assert_eq!(parse_money("₹99.9").unwrap(), Money::from_minor(9_990));
        assert!(parse_money("abc").is_err());
    }

    #[test]
    fn test_parse_tax() {
        assert_eq!(parse_tax("18").unwrap().bps(), 1800);
        assert_eq!(parse_tax("5%").unwrap().bps(), 500);
        assert_eq!(parse_tax("0").unwrap(), TaxRate::zero());
        assert!(parse_tax("-5").is_err());
        assert!(parse_tax("gst").is_err());
        assert!(parse_tax("12.5").is_err());

        let err = parse_tax("7").unwrap_err();
        assert!(err.contains("0, 5, 12, 18, 28"));
    }

    #[test]
    fn test_resolve_id() {
        let ids = ["abc123", "abd456", "xyz"];
        assert_eq!(resolve_id("Invoice", "abc", ids.iter().copied()).unwrap(), "abc123");
        assert_eq!(resolve_id("Invoice", "xyz", ids.iter().copied()).unwrap(), "xyz");
        assert!(matches!(
            resolve_id("Invoice", "ab", ids.iter().copied()),
            Err(ApiError { code: crate::error::ErrorCode::ValidationError, .. })
        ));
        assert!(matches!(
            resolve_id("Invoice", "q", ids.iter().copied()),
            Err(ApiError { code: crate::error::ErrorCode::NotFound, .. })
        ));
    }

    #[test]
    fn test_output_render() {
        let out = Output::message("Saved");
        assert_eq!(out.render(false), "Saved");
        assert_eq!(out.render(true), r#"{"message":"Saved"}"#);

        let out = Output::data("1 row", &vec![1, 2]).unwrap();
        assert_eq!(out.render(false), "1 row");
        assert!(out.render(true).contains('2'));
    }

    #[test]
    fn test_unsaved_output_carries_warning() {
        assert_eq!(Output::message("Saved").persisted(true), Output::message("Saved"));

        let out = Output::message("Saved").persisted(false);
        assert!(out.text().starts_with("Saved\n"));
        assert!(out.text().ends_with(NOT_SAVED_WARNING));
        assert!(out.render(true).contains("could not save"));

        let out = Output::data("1 row", &serde_json::json!({ "id": "a1" }))
            .unwrap()
            .persisted(false);
        assert!(out.text().contains(NOT_SAVED_WARNING));
        assert!(out.render(true).contains("\"warning\""));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 4, 5)), "05 Apr 2024");
        assert_eq!(format_date(None), "—");
    }
}
