//! # Invoice Lifecycle
//!
//! Numbering, saving, status changes and customer prefill for invoices and
//! purchase bills.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  new_invoice() ──► edit fields ──► save_invoice(status)                │
//! │                                          │                              │
//! │                    ┌─────────────────────┼──────────────────────┐       │
//! │                    ▼                     ▼                      ▼       │
//! │             SaveAction::Draft    SaveAction::Share    SaveAction::MarkPaid
//! │               status=draft         status=unpaid        status=paid     │
//! │                                                                         │
//! │  save_invoice keeps `paid` as entered; mark_paid sets paid = total      │
//! │  save_invoice: validate ─► recompute totals ─► upsert by id             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status changes are not validated: a paid invoice can go back to unpaid.
//! Only `save_invoice`, `mark_paid` and `set_status` write the status.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::repository::{self, Commit};
use crate::totals::InvoiceTotals;
use crate::types::{Customer, Invoice, InvoiceKind, InvoiceStatus, LineItem, Settings, Snapshot};
use crate::{CUSTOMER_SUGGESTION_LIMIT, DEFAULT_DUE_DAYS};

// =============================================================================
// Save Actions
// =============================================================================

/// The three ways an invoice form can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    /// Keep working on it later.
    Draft,
    /// Issue to the customer.
    Share,
    /// Issue and record full payment.
    MarkPaid,
}

impl SaveAction {
    pub const fn status(&self) -> InvoiceStatus {
        match self {
            SaveAction::Draft => InvoiceStatus::Draft,
            SaveAction::Share => InvoiceStatus::Unpaid,
            SaveAction::MarkPaid => InvoiceStatus::Paid,
        }
    }
}

// =============================================================================
// Numbering
// =============================================================================

/// Suggests the next display number: `INV-0001`, `PUR-0004`, ...
///
/// The sequence is the count of existing records of the same kind plus one,
/// so deleting a record can make a later suggestion collide with an older
/// number. Numbers are advisory; see [`duplicate_numbers`].
///
/// ## Example
/// ```rust
/// use billbook_core::invoice::next_invoice_number;
/// use billbook_core::types::{InvoiceKind, Snapshot};
///
/// let snapshot = Snapshot::default();
/// assert_eq!(next_invoice_number(&snapshot, InvoiceKind::Sale), "INV-0001");
/// assert_eq!(next_invoice_number(&snapshot, InvoiceKind::Purchase), "PUR-0001");
/// ```
pub fn next_invoice_number(snapshot: &Snapshot, kind: InvoiceKind) -> String {
    let count = snapshot.invoices_of(kind).count();
    format!("{}-{:04}", kind.prefix(), count + 1)
}

/// A display number shared by more than one record of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateNumber {
    pub kind: InvoiceKind,
    pub number: String,
    pub count: usize,
}

/// Lists display numbers used more than once within a kind, in first-seen
/// order. Uniqueness is reported here, never enforced on save.
pub fn duplicate_numbers(snapshot: &Snapshot) -> Vec<DuplicateNumber> {
    let mut order: Vec<(InvoiceKind, &str)> = Vec::new();
    let mut counts: HashMap<(InvoiceKind, &str), usize> = HashMap::new();

    for invoice in snapshot.invoices.iter().filter(|inv| !inv.number.is_empty()) {
        let key = (invoice.kind, invoice.number.as_str());
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let count = counts[&key];
            (count > 1).then(|| DuplicateNumber {
                kind: key.0,
                number: key.1.to_string(),
                count,
            })
        })
        .collect()
}

// =============================================================================
// New Invoice
// =============================================================================

/// A blank invoice ready for editing, due in the default number of days.
pub fn new_invoice(snapshot: &Snapshot, kind: InvoiceKind, today: NaiveDate) -> Invoice {
    new_invoice_due_in(snapshot, kind, today, DEFAULT_DUE_DAYS)
}

/// A blank invoice: fresh id, suggested number, issue date `today`, one
/// empty line item, status unpaid.
pub fn new_invoice_due_in(
    snapshot: &Snapshot,
    kind: InvoiceKind,
    today: NaiveDate,
    due_days: u64,
) -> Invoice {
    let item = LineItem {
        id: repository::fresh_id::<Invoice>(snapshot),
        ..LineItem::default()
    };

    Invoice {
        id: repository::fresh_id::<Invoice>(snapshot),
        number: next_invoice_number(snapshot, kind),
        date: Some(today),
        due_date: today.checked_add_days(Days::new(due_days)),
        items: vec![item],
        status: InvoiceStatus::Unpaid,
        kind,
        ..Invoice::default()
    }
}

// =============================================================================
// Save / Status
// =============================================================================

/// Validates and upserts an invoice.
///
/// ## Behaviour
/// - `status` overrides the record's own status when given
/// - totals are recomputed from items and discount
/// - `paid` is kept as given, whatever the status; see [`mark_paid`]
/// - an existing id is replaced in place, otherwise the record is appended
/// - an empty id gets a fresh one, an empty number gets the next suggestion
///
/// ## Example
/// ```rust
/// use billbook_core::invoice::{save_invoice, SaveAction};
/// use billbook_core::money::Money;
/// use billbook_core::types::{Invoice, InvoiceStatus, LineItem, Snapshot, TaxRate};
///
/// let invoice = Invoice {
///     customer: "Acme".into(),
///     items: vec![LineItem::new("Audit", 1.0, Money::from_minor(50_000), TaxRate::zero())],
///     ..Invoice::default()
/// };
/// let commit = save_invoice(&Snapshot::default(), invoice, Some(SaveAction::Draft.status())).unwrap();
///
/// assert_eq!(commit.record.status, InvoiceStatus::Draft);
/// assert_eq!(commit.record.number, "INV-0001");
/// assert_eq!(commit.record.total.minor(), 50_000);
/// ```
pub fn save_invoice(
    snapshot: &Snapshot,
    mut invoice: Invoice,
    status: Option<InvoiceStatus>,
) -> CoreResult<Commit<Invoice>> {
    if let Some(status) = status {
        invoice.status = status;
    }
    invoice.customer = invoice.customer.trim().to_string();
    invoice.recompute_totals();
    crate::validation::validate_invoice(&invoice)?;

    if invoice.number.trim().is_empty() {
        invoice.number = next_invoice_number(snapshot, invoice.kind);
    }
    if invoice.id.is_empty() {
        invoice.id = repository::fresh_id::<Invoice>(snapshot);
    }
    for item in invoice.items.iter_mut().filter(|item| item.id.is_empty()) {
        item.id = repository::fresh_id::<Invoice>(snapshot);
    }

    let mut next = snapshot.clone();
    match next.invoices.iter_mut().find(|inv| inv.id == invoice.id) {
        Some(existing) => *existing = invoice.clone(),
        None => next.invoices.push(invoice.clone()),
    }

    Ok(Commit {
        snapshot: next,
        record: invoice,
    })
}

/// Settles an invoice: status paid and `paid = total` together.
///
/// Idempotent: marking a paid invoice paid again yields an equal snapshot.
pub fn mark_paid(snapshot: &Snapshot, id: &str) -> CoreResult<Commit<Invoice>> {
    modify(snapshot, id, |invoice| {
        invoice.status = InvoiceStatus::Paid;
        invoice.paid = invoice.total;
    })
}

/// Sets the status without any transition check. `paid` is left as is.
pub fn set_status(
    snapshot: &Snapshot,
    id: &str,
    status: InvoiceStatus,
) -> CoreResult<Commit<Invoice>> {
    modify(snapshot, id, |invoice| invoice.status = status)
}

fn modify(
    snapshot: &Snapshot,
    id: &str,
    change: impl FnOnce(&mut Invoice),
) -> CoreResult<Commit<Invoice>> {
    let mut next = snapshot.clone();
    let invoice = next
        .invoices
        .iter_mut()
        .find(|inv| inv.id == id)
        .ok_or_else(|| CoreError::not_found("Invoice", id))?;
    change(invoice);
    let record = invoice.clone();

    Ok(Commit {
        snapshot: next,
        record,
    })
}

// =============================================================================
// Customer Prefill
// =============================================================================

/// Customer whose name equals `name`, ignoring case.
pub fn find_customer_match<'a>(snapshot: &'a Snapshot, name: &str) -> Option<&'a Customer> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    snapshot
        .customers
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
}

/// Copies name (canonical spelling), phone, tax id and address onto the
/// invoice.
pub fn apply_customer(invoice: &mut Invoice, customer: &Customer) {
    invoice.customer = customer.name.clone();
    invoice.customer_phone = customer.phone.clone();
    invoice.customer_tax_id = customer.tax_id.clone();
    invoice.billing_address = customer.address.clone();
}

/// Applies the matching customer's details, if any customer matches the
/// invoice's customer text.
pub fn prefill_customer(snapshot: &Snapshot, mut invoice: Invoice) -> Invoice {
    if let Some(customer) = find_customer_match(snapshot, &invoice.customer) {
        apply_customer(&mut invoice, customer);
    }
    invoice
}

/// Customers whose name contains `text` (ignoring case), excluding an exact
/// match, at most five.
pub fn customer_suggestions<'a>(snapshot: &'a Snapshot, text: &str) -> Vec<&'a Customer> {
    let wanted = text.trim().to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }
    snapshot
        .customers
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            name.contains(&wanted) && name != wanted
        })
        .take(CUSTOMER_SUGGESTION_LIMIT)
        .collect()
}

// =============================================================================
// Printable Invoice
// =============================================================================

/// Everything needed to render an invoice for printing or sharing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintableInvoice {
    pub invoice: Invoice,
    pub settings: Settings,
    pub totals: InvoiceTotals,
    /// Amount still owed (zero unless unpaid or partial).
    pub balance: Money,
}

impl PrintableInvoice {
    pub fn resolve(snapshot: &Snapshot, id: &str) -> CoreResult<Self> {
        let invoice = repository::get::<Invoice>(snapshot, id)?.clone();
        let totals = invoice.computed_totals();
        let balance = if invoice.status.is_outstanding() {
            totals.total - invoice.paid
        } else {
            Money::zero()
        };

        Ok(Self {
            settings: snapshot.settings.clone(),
            totals,
            balance,
            invoice,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
