//! # Domain Types
//!
//! Core domain types for BillBook: the records that live in a snapshot.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Snapshot                                     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Invoice      │   │    Customer     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  number         │   │  name ◄─ ─ ─ ─ ─│─ ─│─ Invoice.customer│      │
//! │  │  customer (txt) │   │  phone, gst     │   │  price, tax     │       │
//! │  │  items[]        │   │  openingBalance │   │  stock/minStock │       │
//! │  │  status, paid   │   └─────────────────┘   └─────────────────┘       │
//! │  │  subTotal/total │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │    Expense      │   │    Settings     │       │
//! │                        │  category       │   │  businessName   │       │
//! │                        │  amount, payMode│   │  gst, currency  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft References
//! `Invoice.customer` is the customer's name as free text, not an id.
//! Renaming or deleting a customer never touches invoices, and a customer's
//! statistics are matched by exact name.
//!
//! ## Wire Names
//! The serde names are the backup-file names (`gst`, `billingAddr`, `desc`,
//! `qty`, `type`, `payMode`); the Rust names say what the field means.
//! Every field decodes leniently: see the `lenient` helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::lenient;
use crate::money::Money;
use crate::totals::{compute_totals, InvoiceTotals};
use crate::{DEFAULT_MIN_STOCK, DEFAULT_UNIT};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1800 bps = 18% GST.
/// On the wire it is the plain percentage number (`18`), as in backup files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage. Negative or non-finite input
    /// is treated as zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate(0);
        }
        TaxRate((pct * 100.0).round().min(u32::MAX as f64) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}%", self.percentage())
        }
    }
}

impl Serialize for TaxRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u32(self.0 / 100)
        } else {
            serializer.serialize_f64(self.percentage())
        }
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TaxRate::from_percentage(lenient::number(&value)))
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Sale invoice or purchase bill. Both share one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum InvoiceKind {
    #[default]
    Sale,
    Purchase,
}

impl InvoiceKind {
    /// Display-number prefix: `INV` for sales, `PUR` for purchase bills.
    pub const fn prefix(&self) -> &'static str {
        match self {
            InvoiceKind::Sale => "INV",
            InvoiceKind::Purchase => "PUR",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            InvoiceKind::Sale => "Invoice",
            InvoiceKind::Purchase => "Purchase Bill",
        }
    }
}

/// Invoice payment status.
///
/// ## Lifecycle
/// ```text
/// ┌───────┐  share   ┌────────┐  part-pay  ┌─────────┐
/// │ Draft │ ───────► │ Unpaid │ ─────────► │ Partial │
/// └───────┘          └───┬────┘            └────┬────┘
///     │                  │      mark_paid       │
///     └──────────────────┴──────────┬───────────┘
///                                   ▼
///                               ┌──────┐
///                               │ Paid │  paid == total
///                               └──────┘
/// ```
/// Transitions are not validated: any status may be set at any time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum InvoiceStatus {
    /// Work in progress; excluded from every revenue and due figure.
    Draft,
    /// Issued, nothing received yet.
    #[default]
    Unpaid,
    /// Issued, part of the total received (`paid`).
    Partial,
    /// Fully settled.
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Unpaid,
        InvoiceStatus::Partial,
        InvoiceStatus::Paid,
    ];

    /// Unpaid and partial invoices carry an outstanding balance.
    #[inline]
    pub const fn is_outstanding(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Partial)
    }

    /// Everything except drafts counts toward sales and customer figures.
    #[inline]
    pub const fn counts_toward_revenue(&self) -> bool {
        !matches!(self, InvoiceStatus::Draft)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

/// Expense category. Unknown stored names decode as `Misc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseCategory {
    #[default]
    Office,
    Travel,
    Food,
    Utilities,
    Rent,
    Salaries,
    Marketing,
    #[serde(other)]
    Misc,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Office,
        ExpenseCategory::Travel,
        ExpenseCategory::Food,
        ExpenseCategory::Utilities,
        ExpenseCategory::Rent,
        ExpenseCategory::Salaries,
        ExpenseCategory::Marketing,
        ExpenseCategory::Misc,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Office => "Office",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Salaries => "Salaries",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Misc => "Misc",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown expense category '{}'", s))
    }
}

/// How an expense was paid. Unknown stored names decode as `Cash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    Card,
    #[serde(rename = "UPI")]
    Upi,
    Cheque,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    // catch-all must be the last variant
    #[default]
    #[serde(other)]
    Cash,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::Cash,
        PaymentMode::Card,
        PaymentMode::Upi,
        PaymentMode::Cheque,
        PaymentMode::BankTransfer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::Upi => "UPI",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown payment mode '{}'", s))
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Customer {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    /// Display name; invoices refer to customers by this exact text.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,

    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,

    #[serde(deserialize_with = "lenient::text")]
    pub email: String,

    /// GSTIN or other tax registration number.
    #[serde(rename = "gst", deserialize_with = "lenient::text")]
    pub tax_id: String,

    #[serde(deserialize_with = "lenient::text")]
    pub address: String,

    #[ts(as = "f64")]
    pub opening_balance: Money,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            tax_id: String::new(),
            address: String::new(),
            opening_balance: Money::zero(),
        }
    }
}

impl Customer {
    /// A customer with only a name; the repository assigns the id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product or service in the catalogue.
///
/// Stock only changes through explicit adjustments or edits; issuing an
/// invoice never decrements it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Product {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(deserialize_with = "lenient::text")]
    pub name: String,

    /// Stock Keeping Unit - business identifier, optional.
    #[serde(deserialize_with = "lenient::text")]
    pub sku: String,

    #[serde(deserialize_with = "lenient::text")]
    pub category: String,

    /// Unit of measure label (`pcs`, `kg`, `hr`, ...).
    #[serde(deserialize_with = "lenient::text")]
    pub unit: String,

    /// Selling price per unit.
    #[ts(as = "f64")]
    pub price: Money,

    #[ts(as = "f64")]
    pub purchase_price: Money,

    #[serde(rename = "tax")]
    #[ts(as = "f64")]
    pub tax_rate: TaxRate,

    #[serde(deserialize_with = "lenient::stock")]
    pub stock: u32,

    /// Low-stock threshold; 0 means "not set".
    #[serde(deserialize_with = "lenient::stock")]
    pub min_stock: u32,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            sku: String::new(),
            category: String::new(),
            unit: DEFAULT_UNIT.to_string(),
            price: Money::zero(),
            purchase_price: Money::zero(),
            tax_rate: TaxRate::zero(),
            stock: 0,
            min_stock: DEFAULT_MIN_STOCK,
        }
    }
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money, tax_rate: TaxRate) -> Self {
        Self {
            name: name.into(),
            price,
            tax_rate,
            ..Self::default()
        }
    }

    /// Effective low-stock threshold: `min_stock`, or the default when unset.
    #[inline]
    pub fn low_stock_threshold(&self) -> u32 {
        if self.min_stock == 0 {
            DEFAULT_MIN_STOCK
        } else {
            self.min_stock
        }
    }

    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold()
    }

    /// Applies a signed stock delta, flooring at zero.
    pub fn adjusted_stock(&self, delta: i64) -> u32 {
        (i64::from(self.stock) + delta).clamp(0, i64::from(u32::MAX)) as u32
    }
}

// =============================================================================
// Line Item
// =============================================================================

fn default_quantity() -> f64 {
    1.0
}

/// One row of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct LineItem {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(rename = "desc", deserialize_with = "lenient::text")]
    pub description: String,

    /// May be fractional (`2.5` kg).
    #[serde(rename = "qty", deserialize_with = "lenient::quantity")]
    pub quantity: f64,

    /// Unit price.
    #[ts(as = "f64")]
    pub price: Money,

    #[serde(rename = "tax")]
    #[ts(as = "f64")]
    pub tax_rate: TaxRate,

    #[serde(deserialize_with = "lenient::text")]
    pub unit: String,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            description: String::new(),
            quantity: default_quantity(),
            price: Money::zero(),
            tax_rate: TaxRate::zero(),
            unit: DEFAULT_UNIT.to_string(),
        }
    }
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        price: Money,
        tax_rate: TaxRate,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            price,
            tax_rate,
            ..Self::default()
        }
    }

    /// A line pre-filled from a catalogue product (quantity 1).
    pub fn from_product(product: &Product) -> Self {
        Self {
            description: product.name.clone(),
            price: product.price,
            tax_rate: product.tax_rate,
            unit: product.unit.clone(),
            ..Self::default()
        }
    }

    /// quantity × price, rounded to the minor unit.
    #[inline]
    pub fn amount(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// amount × tax%.
    #[inline]
    pub fn tax(&self) -> Money {
        self.amount().calculate_tax(self.tax_rate)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A sale invoice or purchase bill.
///
/// `sub_total`, `tax_total` and `total` are derived from `items` and
/// `discount`; they are stored for the wire format and always recomputed on
/// save (see [`Invoice::recompute_totals`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Invoice {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    /// Display number (`INV-0001`); advisory, not guaranteed unique.
    #[serde(deserialize_with = "lenient::text")]
    pub number: String,

    /// Issue date.
    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,

    /// Customer (or supplier) name as free text.
    #[serde(deserialize_with = "lenient::text")]
    pub customer: String,

    #[serde(deserialize_with = "lenient::text")]
    pub customer_phone: String,

    #[serde(rename = "customerGST", deserialize_with = "lenient::text")]
    pub customer_tax_id: String,

    #[serde(rename = "billingAddr", deserialize_with = "lenient::text")]
    pub billing_address: String,

    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<LineItem>,

    /// Flat discount taken off subtotal + tax.
    #[ts(as = "f64")]
    pub discount: Money,

    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,

    #[serde(deserialize_with = "lenient::or_default")]
    pub status: InvoiceStatus,

    /// Amount received so far.
    #[ts(as = "f64")]
    pub paid: Money,

    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub kind: InvoiceKind,

    #[ts(as = "f64")]
    pub sub_total: Money,

    #[ts(as = "f64")]
    pub tax_total: Money,

    #[ts(as = "f64")]
    pub total: Money,
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            id: String::new(),
            number: String::new(),
            date: None,
            due_date: None,
            customer: String::new(),
            customer_phone: String::new(),
            customer_tax_id: String::new(),
            billing_address: String::new(),
            items: Vec::new(),
            discount: Money::zero(),
            notes: String::new(),
            status: InvoiceStatus::Unpaid,
            paid: Money::zero(),
            kind: InvoiceKind::Sale,
            sub_total: Money::zero(),
            tax_total: Money::zero(),
            total: Money::zero(),
        }
    }
}

impl Invoice {
    /// Totals computed from the current items and discount.
    pub fn computed_totals(&self) -> InvoiceTotals {
        compute_totals(&self.items, self.discount)
    }

    /// Overwrites the stored totals with freshly computed ones.
    pub fn recompute_totals(&mut self) {
        let totals = self.computed_totals();
        self.sub_total = totals.sub_total;
        self.tax_total = totals.tax_total;
        self.total = totals.total;
    }

    /// `total - paid` while unpaid or partial, otherwise zero.
    #[inline]
    pub fn outstanding(&self) -> Money {
        if self.status.is_outstanding() {
            self.total - self.paid
        } else {
            Money::zero()
        }
    }

    #[inline]
    pub fn is_sale(&self) -> bool {
        self.kind == InvoiceKind::Sale
    }

    #[inline]
    pub fn is_draft(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Expense {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient::or_default")]
    pub category: ExpenseCategory,

    #[serde(rename = "desc", deserialize_with = "lenient::text")]
    pub description: String,

    #[ts(as = "f64")]
    pub amount: Money,

    #[serde(rename = "payMode", deserialize_with = "lenient::or_default")]
    pub payment_mode: PaymentMode,

    /// Bill number, cheque number or transaction id.
    #[serde(deserialize_with = "lenient::text")]
    pub reference: String,
}

impl Default for Expense {
    fn default() -> Self {
        Self {
            id: String::new(),
            date: None,
            category: ExpenseCategory::Office,
            description: String::new(),
            amount: Money::zero(),
            payment_mode: PaymentMode::Cash,
            reference: String::new(),
        }
    }
}

impl Expense {
    pub fn new(date: NaiveDate, category: ExpenseCategory, amount: Money) -> Self {
        Self {
            date: Some(date),
            category,
            amount,
            ..Self::default()
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Business profile printed on invoices. Overwrite-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Settings {
    #[serde(deserialize_with = "lenient::text")]
    pub business_name: String,

    #[serde(rename = "gst", deserialize_with = "lenient::text")]
    pub tax_id: String,

    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,

    #[serde(deserialize_with = "lenient::text")]
    pub address: String,

    #[serde(deserialize_with = "lenient::text")]
    pub email: String,

    /// Currency symbol used for display.
    #[serde(deserialize_with = "lenient::text")]
    pub currency: String,

    /// Preferred invoice prefix, shown on the settings screen only.
    #[serde(deserialize_with = "lenient::text")]
    pub invoice_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business_name: "My Business".to_string(),
            tax_id: String::new(),
            phone: String::new(),
            address: String::new(),
            email: String::new(),
            currency: "₹".to_string(),
            invoice_prefix: String::new(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The whole data set at one instant.
///
/// Every repository and lifecycle operation takes `&Snapshot` and returns a
/// new value; nothing mutates a snapshot in place. The serialized form is
/// both the stored blob and the backup file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Snapshot {
    #[serde(deserialize_with = "lenient::list")]
    pub invoices: Vec<Invoice>,

    #[serde(deserialize_with = "lenient::list")]
    pub customers: Vec<Customer>,

    #[serde(deserialize_with = "lenient::list")]
    pub products: Vec<Product>,

    #[serde(deserialize_with = "lenient::list")]
    pub expenses: Vec<Expense>,

    #[serde(deserialize_with = "lenient::or_default")]
    pub settings: Settings,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| inv.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Sale invoices or purchase bills only.
    pub fn invoices_of(&self, kind: InvoiceKind) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter().filter(move |inv| inv.kind == kind)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tax_rate_wire_shape() {
        assert_eq!(serde_json::to_value(TaxRate::from_percentage(18.0)).unwrap(), json!(18));
        assert_eq!(serde_json::to_value(TaxRate::from_bps(825)).unwrap(), json!(8.25));

        let rate: TaxRate = serde_json::from_value(json!("12")).unwrap();
        assert_eq!(rate.bps(), 1200);
        let rate: TaxRate = serde_json::from_value(json!(null)).unwrap();
        assert!(rate.is_zero());
        assert!(TaxRate::from_percentage(-5.0).is_zero());
    }

    #[test]
    fn test_status_parse_and_predicates() {
        assert_eq!("PAID".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
        assert!("overdue".parse::<InvoiceStatus>().is_err());

        assert!(InvoiceStatus::Unpaid.is_outstanding());
        assert!(InvoiceStatus::Partial.is_outstanding());
        assert!(!InvoiceStatus::Paid.is_outstanding());
        assert!(!InvoiceStatus::Draft.counts_toward_revenue());
    }

    #[test]
    fn test_payment_mode_names() {
        assert_eq!(serde_json::to_value(PaymentMode::Upi).unwrap(), json!("UPI"));
        assert_eq!(
            serde_json::to_value(PaymentMode::BankTransfer).unwrap(),
            json!("Bank Transfer")
        );
        assert_eq!("bank-transfer".parse::<PaymentMode>().unwrap(), PaymentMode::BankTransfer);
        assert_eq!("upi".parse::<PaymentMode>().unwrap(), PaymentMode::Upi);
    }

    #[test]
    fn test_invoice_decodes_with_defaults() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "a1",
            "number": "INV-0001",
            "date": "2024-01-15",
            "customer": "Acme",
            "items": [{ "desc": "Widget", "qty": "2", "price": 100, "tax": 18 }],
            "status": "archived",
            "paid": null
        }))
        .unwrap();

        assert_eq!(invoice.kind, InvoiceKind::Sale);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.paid, Money::zero());
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(invoice.due_date, None);
        assert_eq!(invoice.items[0].quantity, 2.0);
        assert_eq!(invoice.items[0].unit, "pcs");
        assert_eq!(invoice.items[0].amount().minor(), 20_000);
    }

    #[test]
    fn test_invoice_wire_names() {
        let mut invoice = Invoice {
            customer_tax_id: "29ABCDE1234F1Z5".to_string(),
            billing_address: "MG Road".to_string(),
            kind: InvoiceKind::Purchase,
            ..Invoice::default()
        };
        invoice.items.push(LineItem::new("Bolt", 3.0, Money::from_minor(250), TaxRate::zero()));

        let value = serde_json::to_value(&invoice).unwrap();
        assert_eq!(value["customerGST"], json!("29ABCDE1234F1Z5"));
        assert_eq!(value["billingAddr"], json!("MG Road"));
        assert_eq!(value["type"], json!("purchase"));
        assert_eq!(value["items"][0]["desc"], json!("Bolt"));
        assert_eq!(value["items"][0]["qty"], json!(3.0));
        assert_eq!(value["items"][0]["price"], json!(2.5));
        assert!(value.get("date").is_none());
    }

    #[test]
    fn test_expense_lenient_enums() {
        let expense: Expense = serde_json::from_value(json!({
            "category": "Entertainment",
            "payMode": "Crypto",
            "amount": "450"
        }))
        .unwrap();
        assert_eq!(expense.category, ExpenseCategory::Misc);
        assert_eq!(expense.payment_mode, PaymentMode::Cash);
        assert_eq!(expense.amount.minor(), 45_000);

        let expense: Expense = serde_json::from_value(json!({ "category": null })).unwrap();
        assert_eq!(expense.category, ExpenseCategory::Office);
    }

    #[test]
    fn test_product_low_stock_threshold() {
        let mut product = Product::new("Pen", Money::from_minor(1_000), TaxRate::zero());
        product.stock = 5;
        assert!(product.is_low_stock());

        product.min_stock = 0;
        assert_eq!(product.low_stock_threshold(), DEFAULT_MIN_STOCK);

        product.min_stock = 2;
        assert!(!product.is_low_stock());

        assert_eq!(product.adjusted_stock(-10), 0);
        assert_eq!(product.adjusted_stock(3), 8);
    }

    #[test]
    fn test_product_stock_decodes_floor_clamped() {
        let product: Product = serde_json::from_value(json!({
            "name": "Bag",
            "stock": -4,
            "minStock": "3.9"
        }))
        .unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.min_stock, 3);
        assert_eq!(product.unit, "pcs");
    }

    #[test]
    fn test_snapshot_tolerates_missing_and_bad_collections() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "invoices": [],
            "customers": [{ "name": "Ravi" }, 42],
            "products": "oops"
        }))
        .unwrap();

        assert_eq!(snapshot.customers.len(), 1);
        assert!(snapshot.products.is_empty());
        assert!(snapshot.expenses.is_empty());
        assert_eq!(snapshot.settings, Settings::default());
        assert_eq!(snapshot.settings.business_name, "My Business");
        assert_eq!(snapshot.settings.currency, "₹");
    }
}
