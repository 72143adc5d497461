//! # Invoice Commands
//!
//! Sale invoices and, with `--purchase`, purchase bills.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoice new --customer Acme --item "Audit:1:5000:18"                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  new_invoice_due_in(due_days) ──► prefill_customer ──► items, discount  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save_invoice(status)                                                   │
//! │     --draft ──► draft      (default) ──► unpaid      --paid ──► paid    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbState::commit ──► "Saved INV-0007 for Acme: ₹5,900.00 (unpaid)"      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoices are addressed by display number (`INV-0007`) or id prefix.

use billbook_core::invoice::{
    customer_suggestions, duplicate_numbers, find_customer_match, mark_paid, new_invoice_due_in,
    prefill_customer, save_invoice, set_status, PrintableInvoice, SaveAction,
};
use billbook_core::query::{filter_invoices, InvoiceFilter};
use billbook_core::reports::summarize_invoices;
use billbook_core::{
    repository, Invoice, InvoiceKind, InvoiceStatus, LineItem, Money, Product, Snapshot, TaxRate,
};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Args, Subcommand};
use comfy_table::{Cell, CellAlignment, Color};
use std::fmt::Write as _;
use tracing::{debug, info};

use super::{
    format_date, or_dash, parse_money, parse_tax, require_yes, resolve_id, table, Formatter,
    Output,
};
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// List invoices (or purchase bills), newest first
    List {
        #[arg(long)]
        purchase: bool,
        /// Match number or customer
        #[arg(short, long, default_value = "")]
        search: String,
        /// draft, unpaid, partial or paid
        #[arg(long)]
        status: Option<InvoiceStatus>,
    },
    /// Create an invoice (or purchase bill)
    #[command(group(ArgGroup::new("action").args(["draft", "paid"])))]
    New {
        #[arg(long)]
        purchase: bool,
        /// Customer (or supplier) name; details are copied from the directory
        #[arg(long)]
        customer: String,
        /// Save as draft
        #[arg(long)]
        draft: bool,
        /// Save as paid
        #[arg(long)]
        paid: bool,
        #[command(flatten)]
        fields: InvoiceFields,
    },
    /// Edit an invoice; --item/--product replace all line items
    Edit {
        /// Invoice number or id prefix
        invoice: String,
        #[arg(long)]
        customer: Option<String>,
        /// Amount received so far
        #[arg(long, value_parser = parse_money)]
        received: Option<Money>,
        #[command(flatten)]
        fields: InvoiceFields,
    },
    /// Print an invoice
    Show { invoice: String },
    /// Mark an invoice paid in full
    MarkPaid { invoice: String },
    /// Set the status without touching the amount received
    Status {
        invoice: String,
        status: InvoiceStatus,
    },
    /// Delete an invoice
    Delete {
        invoice: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct InvoiceFields {
    /// Display number (default: next free INV-/PUR- number)
    #[arg(long)]
    pub number: Option<String>,
    /// Issue date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Due date, YYYY-MM-DD (default: issue date + due days)
    #[arg(long)]
    pub due: Option<NaiveDate>,
    /// Line item as DESCRIPTION:QTY:PRICE[:TAX[:UNIT]]; repeatable
    #[arg(long = "item", value_parser = parse_item)]
    pub items: Vec<LineItem>,
    /// Catalogue product as NAME_OR_SKU[:QTY]; repeatable
    #[arg(long = "product")]
    pub products: Vec<String>,
    #[arg(long, value_parser = parse_money)]
    pub discount: Option<Money>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Customer GSTIN
    #[arg(long)]
    pub gst: Option<String>,
    /// Billing address
    #[arg(long)]
    pub address: Option<String>,
}

impl InvoiceFields {
    /// Applies the given fields. Line items are replaced only when
    /// `--item` or `--product` was given.
    fn apply(self, snapshot: &Snapshot, invoice: &mut Invoice) -> ApiResult<()> {
        let mut items = self.items;
        for spec in &self.products {
            items.push(product_item(snapshot, spec)?);
        }
        if !items.is_empty() {
            invoice.items = items;
        }

        if let Some(number) = self.number {
            invoice.number = number;
        }
        if let Some(date) = self.date {
            invoice.date = Some(date);
        }
        if let Some(due) = self.due {
            invoice.due_date = Some(due);
        }
        if let Some(discount) = self.discount {
            invoice.discount = discount;
        }
        if let Some(notes) = self.notes {
            invoice.notes = notes;
        }
        if let Some(phone) = self.phone {
            invoice.customer_phone = phone;
        }
        if let Some(gst) = self.gst {
            invoice.customer_tax_id = gst;
        }
        if let Some(address) = self.address {
            invoice.billing_address = address;
        }
        Ok(())
    }
}

/// clap parser for `DESCRIPTION:QTY:PRICE[:TAX[:UNIT]]`.
pub fn parse_item(spec: &str) -> Result<LineItem, String> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    if !(3..=5).contains(&parts.len()) {
        return Err(format!(
            "'{}' should look like DESCRIPTION:QTY:PRICE[:TAX[:UNIT]]",
            spec
        ));
    }

    let quantity: f64 = parts[1]
        .parse()
        .ok()
        .filter(|q: &f64| q.is_finite())
        .ok_or_else(|| format!("'{}' is not a quantity", parts[1]))?;
    let price = parse_money(parts[2])?;
    let tax = match parts.get(3) {
        Some(tax) if !tax.is_empty() => parse_tax(tax)?,
        _ => TaxRate::zero(),
    };

    let mut item = LineItem::new(parts[0], quantity, price, tax);
    if let Some(unit) = parts.get(4).filter(|u| !u.is_empty()) {
        item.unit = unit.to_string();
    }
    Ok(item)
}

/// A line from the catalogue: `NAME_OR_SKU[:QTY]`.
fn product_item(snapshot: &Snapshot, spec: &str) -> ApiResult<LineItem> {
    let (key, quantity) = match spec.rsplit_once(':') {
        Some((key, qty)) => {
            let qty: f64 = qty
                .trim()
                .parse()
                .map_err(|_| ApiError::validation(format!("'{}' is not a quantity", qty)))?;
            (key.trim(), qty)
        }
        None => (spec.trim(), 1.0),
    };

    let wanted = key.to_lowercase();
    let product: &Product = snapshot
        .products
        .iter()
        .find(|p| !p.sku.is_empty() && p.sku.to_lowercase() == wanted)
        .or_else(|| snapshot.products.iter().find(|p| p.name.to_lowercase() == wanted))
        .ok_or_else(|| ApiError::not_found("Product", key))?;

    Ok(LineItem {
        quantity,
        ..LineItem::from_product(product)
    })
}

/// Resolves an invoice by display number (ignoring case) or id prefix.
fn invoice_id(snapshot: &Snapshot, key: &str) -> ApiResult<String> {
    let wanted = key.trim().to_lowercase();
    let by_number: Vec<&Invoice> = snapshot
        .invoices
        .iter()
        .filter(|inv| inv.number.to_lowercase() == wanted)
        .collect();

    match by_number.as_slice() {
        [invoice] => Ok(invoice.id.clone()),
        [] => resolve_id("Invoice", key, snapshot.invoices.iter().map(|i| i.id.as_str())),
        many => Err(ApiError::validation(format!(
            "{} invoices share the number {}; use the id instead",
            many.len(),
            key.trim()
        ))),
    }
}

fn kind_of(purchase: bool) -> InvoiceKind {
    if purchase {
        InvoiceKind::Purchase
    } else {
        InvoiceKind::Sale
    }
}

pub async fn run(cmd: InvoiceCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        InvoiceCommand::List { purchase, search, status } => {
            let filter = InvoiceFilter {
                kind: kind_of(purchase),
                search,
                status,
            };
            list(db, config, &filter)
        }
        InvoiceCommand::New { purchase, customer, draft, paid, fields } => {
            let action = if draft {
                SaveAction::Draft
            } else if paid {
                SaveAction::MarkPaid
            } else {
                SaveAction::Share
            };
            create(db, config, kind_of(purchase), customer, action, fields).await
        }
        InvoiceCommand::Edit { invoice, customer, received, fields } => {
            let id = invoice_id(db.snapshot(), &invoice)?;
            let mut invoice = repository::get::<Invoice>(db.snapshot(), &id)?.clone();

            if let Some(customer) = customer {
                invoice.customer = customer;
                invoice = prefill_customer(db.snapshot(), invoice);
            }
            if let Some(received) = received {
                invoice.paid = received;
            }
            fields.apply(db.snapshot(), &mut invoice)?;

            let commit = save_invoice(db.snapshot(), invoice, None)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            debug!(id = %record.id, number = %record.number, "Invoice updated");
            let fmt = Formatter::new(config, &db.snapshot().settings);
            Ok(Output::message(format!(
                "Updated {}: {} ({})",
                record.number,
                fmt.money(record.total),
                record.status
            ))
            .persisted(saved))
        }
        InvoiceCommand::Show { invoice } => {
            let id = invoice_id(db.snapshot(), &invoice)?;
            let printable = PrintableInvoice::resolve(db.snapshot(), &id)?;
            let fmt = Formatter::new(config, &printable.settings);
            Output::data(render(&printable, &fmt), &printable)
        }
        InvoiceCommand::MarkPaid { invoice } => {
            let id = invoice_id(db.snapshot(), &invoice)?;
            let commit = mark_paid(db.snapshot(), &id)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, number = %record.number, "Invoice marked paid");
            Ok(Output::message(format!("{} marked paid", record.number)).persisted(saved))
        }
        InvoiceCommand::Status { invoice, status } => {
            let id = invoice_id(db.snapshot(), &invoice)?;
            let commit = set_status(db.snapshot(), &id, status)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, status = %record.status, "Invoice status changed");
            Ok(Output::message(format!("{} is now {}", record.number, record.status)).persisted(saved))
        }
        InvoiceCommand::Delete { invoice, yes } => {
            let id = invoice_id(db.snapshot(), &invoice)?;
            require_yes(yes, "delete an invoice")?;

            let commit = repository::delete::<Invoice>(db.snapshot(), &id)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, number = %record.number, "Invoice deleted");
            Ok(Output::message(format!("Deleted {}", record.number)).persisted(saved))
        }
    }
}

async fn create(
    db: &mut DbState,
    config: &ConfigState,
    kind: InvoiceKind,
    customer: String,
    action: SaveAction,
    fields: InvoiceFields,
) -> ApiResult<Output> {
    let today = Local::now().date_naive();
    let date = fields.date.unwrap_or(today);

    let mut invoice = new_invoice_due_in(db.snapshot(), kind, date, config.due_days);
    invoice.items.clear();
    invoice.customer = customer;
    invoice = prefill_customer(db.snapshot(), invoice);

    let known = find_customer_match(db.snapshot(), &invoice.customer).is_some();
    let suggestions: Vec<String> = if known {
        Vec::new()
    } else {
        customer_suggestions(db.snapshot(), &invoice.customer)
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    };

    fields.apply(db.snapshot(), &mut invoice)?;

    let mut commit = save_invoice(db.snapshot(), invoice, Some(action.status()))?;
    if action == SaveAction::MarkPaid {
        commit = mark_paid(&commit.snapshot, &commit.record.id)?;
    }
    let record = commit.record;
    let saved = db.commit(commit.snapshot).await;

    info!(
        id = %record.id,
        number = %record.number,
        kind = record.kind.label(),
        status = %record.status,
        "Invoice saved"
    );

    let fmt = Formatter::new(config, &db.snapshot().settings);
    let mut text = format!(
        "Saved {} for {}: {} ({})",
        record.number,
        record.customer,
        fmt.money(record.total),
        record.status
    );
    if !suggestions.is_empty() {
        let _ = write!(
            text,
            "\nNote: '{}' is not in the customer directory. Did you mean: {}?",
            record.customer,
            suggestions.join(", ")
        );
    }
    Ok(Output::message(text).persisted(saved))
}

fn status_cell(status: InvoiceStatus) -> Cell {
    let cell = Cell::new(status);
    match status {
        InvoiceStatus::Paid => cell.fg(Color::Green),
        InvoiceStatus::Partial => cell.fg(Color::Yellow),
        InvoiceStatus::Unpaid => cell.fg(Color::Red),
        InvoiceStatus::Draft => cell.fg(Color::DarkGrey),
    }
}

fn list(db: &DbState, config: &ConfigState, filter: &InvoiceFilter) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);
    let invoices = filter_invoices(snapshot, filter);
    let noun = match filter.kind {
        InvoiceKind::Sale => "invoice",
        InvoiceKind::Purchase => "purchase bill",
    };

    if invoices.is_empty() {
        return Output::data(format!("No {}s found.", noun), &invoices);
    }

    let party = match filter.kind {
        InvoiceKind::Sale => "Customer",
        InvoiceKind::Purchase => "Supplier",
    };
    let mut out = table(&["Number", "Date", party, "Total", "Paid", "Due", "Status"]);
    for inv in &invoices {
        out.add_row(vec![
            Cell::new(&inv.number),
            Cell::new(format_date(inv.date)),
            Cell::new(or_dash(&inv.customer)),
            Cell::new(fmt.money(inv.total)).set_alignment(CellAlignment::Right),
            Cell::new(fmt.money(inv.paid)).set_alignment(CellAlignment::Right),
            Cell::new(fmt.money(inv.outstanding())).set_alignment(CellAlignment::Right),
            status_cell(inv.status),
        ]);
    }

    let summary = summarize_invoices(invoices.iter().copied());
    let mut text = format!(
        "{out}\n{} {}(s) · total {} · received {} · due {}",
        summary.count,
        noun,
        fmt.money(summary.total),
        fmt.money(summary.received),
        fmt.money(summary.due)
    );

    for dup in duplicate_numbers(snapshot).iter().filter(|d| d.kind == filter.kind) {
        let _ = write!(text, "\nWarning: {} is used by {} {}s", dup.number, dup.count, noun);
    }

    Output::data(text, &invoices)
}

/// Plain-text rendering of a printable invoice.
pub fn render(printable: &PrintableInvoice, fmt: &Formatter) -> String {
    let inv = &printable.invoice;
    let s = &printable.settings;
    let mut out = String::new();

    let title = match inv.kind {
        InvoiceKind::Sale => "INVOICE",
        InvoiceKind::Purchase => "PURCHASE",
    };
    let _ = writeln!(out, "{}  ·  {} #{}", s.business_name, title, inv.number);
    for (label, value) in [("GST", &s.tax_id), ("Phone", &s.phone), ("Email", &s.email), ("Address", &s.address)] {
        if !value.trim().is_empty() {
            let _ = writeln!(out, "  {}: {}", label, value);
        }
    }
    let _ = writeln!(out, "Date: {}   Due: {}", format_date(inv.date), format_date(inv.due_date));
    let _ = writeln!(out);

    let party = match inv.kind {
        InvoiceKind::Sale => "Bill To",
        InvoiceKind::Purchase => "Supplier",
    };
    let _ = writeln!(out, "{}: {}", party, inv.customer);
    for (label, value) in [("Phone", &inv.customer_phone), ("GST", &inv.customer_tax_id), ("Address", &inv.billing_address)] {
        if !value.trim().is_empty() {
            let _ = writeln!(out, "  {}: {}", label, value);
        }
    }
    let _ = writeln!(out);

    let mut items = table(&["#", "Description", "Qty", "Unit", "Rate", "Tax", "Amount"]);
    for (n, item) in inv.items.iter().enumerate() {
        items.add_row(vec![
            Cell::new(n + 1),
            Cell::new(&item.description),
            Cell::new(item.quantity).set_alignment(CellAlignment::Right),
            Cell::new(or_dash(&item.unit)),
            Cell::new(fmt.money(item.price)).set_alignment(CellAlignment::Right),
            Cell::new(item.tax_rate).set_alignment(CellAlignment::Right),
            Cell::new(fmt.money(item.amount() + item.tax())).set_alignment(CellAlignment::Right),
        ]);
    }
    let _ = writeln!(out, "{items}");

    let totals = &printable.totals;
    let _ = writeln!(out, "{:>16}  {:>16}", "Sub Total", fmt.money(totals.sub_total));
    let _ = writeln!(out, "{:>16}  {:>16}", "Tax", fmt.money(totals.tax_total));
    if inv.discount.is_positive() {
        let _ = writeln!(out, "{:>16}  {:>16}", "Discount", format!("-{}", fmt.money(inv.discount)));
    }
    let _ = writeln!(out, "{:>16}  {:>16}", "Total", fmt.money(totals.total));
    if inv.paid.is_positive() {
        let _ = writeln!(out, "{:>16}  {:>16}", "Paid", fmt.money(inv.paid));
        let _ = writeln!(out, "{:>16}  {:>16}", "Balance Due", fmt.money(printable.balance));
    }
    let _ = writeln!(out, "{:>16}  {:>16}", "Status", inv.status);

    if !inv.notes.trim().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Notes: {}", inv.notes);
    }
    let _ = writeln!(out);
    let _ = write!(out, "Thank you for your business!");
    out
}
