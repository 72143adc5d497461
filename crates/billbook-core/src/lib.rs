//! # billbook-core: Pure Business Logic for BillBook
//!
//! This crate is the **heart** of BillBook. It contains the invoice
//! lifecycle and the financial computation engine as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BillBook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (billbook)                          │   │
//! │  │    customer ─ product ─ invoice ─ expense ─ report ─ backup     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &Snapshot in, Snapshot out             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ billbook-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌────────────┐ ┌─────────┐ ┌───────┐ │   │
//! │  │  │  money  │ │  totals  │ │ repository │ │ invoice │ │reports│ │   │
//! │  │  │  Money  │ │ compute_ │ │ create     │ │ save    │ │ dash- │ │   │
//! │  │  │ TaxRate │ │  totals  │ │ update     │ │ mark_   │ │ board │ │   │
//! │  │  │         │ │          │ │ delete     │ │  paid   │ │monthly│ │   │
//! │  │  └─────────┘ └──────────┘ └────────────┘ └─────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                billbook-db (Persistence Adapter)                │   │
//! │  │           snapshot blob in SQLite, JSON backup files            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Invoice, Expense, Snapshot)
//! - [`money`] - Money type with integer arithmetic
//! - [`totals`] - Invoice totals calculator
//! - [`repository`] - Snapshot CRUD with generated identifiers
//! - [`invoice`] - Invoice lifecycle (save, mark paid, numbering)
//! - [`reports`] - Dashboard, customer, expense and monthly aggregates
//! - [`query`] - Search, filter and sort over the collections
//! - [`backup`] - Backup file (de)serialization
//! - [`validation`] - Write-boundary validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Snapshots are values**: every write takes `&Snapshot` and returns a new one
//! 2. **No I/O**: Database, network, file system and clock access are FORBIDDEN here
//! 3. **Integer Money**: monetary values are minor units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use billbook_core::money::Money;
//! use billbook_core::totals::compute_totals;
//! use billbook_core::types::{LineItem, TaxRate};
//!
//! let item = LineItem::new("Consulting", 2.0, Money::from_minor(10_000), TaxRate::from_percentage(18.0));
//! let totals = compute_totals(&[item], Money::zero());
//!
//! assert_eq!(totals.sub_total, Money::from_minor(20_000));
//! assert_eq!(totals.tax_total, Money::from_minor(3_600));
//! assert_eq!(totals.total, Money::from_minor(23_600));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod invoice;
mod lenient;
pub mod money;
pub mod query;
pub mod reports;
pub mod repository;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use repository::Commit;
pub use totals::{compute_totals, InvoiceTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax percentages offered on products and line items.
pub const TAX_RATES: [u32; 5] = [0, 5, 12, 18, 28];

/// Units of measure offered on products and line items.
pub const UNITS: [&str; 11] = [
    "pcs", "kg", "g", "litre", "ml", "box", "bag", "set", "pair", "hr", "day",
];

/// Unit label used when none is given.
pub const DEFAULT_UNIT: &str = "pcs";

/// Days between issue date and due date on a fresh invoice.
pub const DEFAULT_DUE_DAYS: u64 = 15;

/// Low-stock threshold used when a product has none.
pub const DEFAULT_MIN_STOCK: u32 = 5;

/// Number of invoices shown in the dashboard's recent list.
pub const RECENT_INVOICES_LIMIT: usize = 6;

/// Number of customers kept in the top-customers ranking.
pub const TOP_CUSTOMERS_LIMIT: usize = 8;

/// Number of most recent months kept in the monthly rollup.
pub const MONTHLY_ROLLUP_MONTHS: usize = 12;

/// Maximum customer name suggestions offered while typing.
pub const CUSTOMER_SUGGESTION_LIMIT: usize = 5;
