//! # Reports
//!
//! Stateless aggregates over a snapshot. Every function here is a pure
//! function of its input and never fails; callers recompute on demand.
//!
//! ## Which Invoices Count Where
//! ```text
//! ┌──────────────────────┬──────────────┬───────────────────────────────────┐
//! │ Figure               │ Kinds        │ Statuses                          │
//! ├──────────────────────┼──────────────┼───────────────────────────────────┤
//! │ Dashboard sales      │ sale + purch │ all but draft            (total)  │
//! │ Dashboard received   │ sale + purch │ paid                     (total)  │
//! │ Dashboard due        │ sale + purch │ unpaid, partial   (total − paid)  │
//! │ Customer stats       │ sale         │ all but draft                     │
//! │ Report revenue       │ sale         │ paid                     (total)  │
//! │ Report due           │ sale         │ unpaid, partial   (total − paid)  │
//! │ Monthly / top cust.  │ sale         │ all but draft                     │
//! │ Status distribution  │ sale         │ all                               │
//! └──────────────────────┴──────────────┴───────────────────────────────────┘
//! ```
//!
//! The dashboard mixes sales and purchase bills in its headline figures;
//! the reports screen looks at sales only.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::money::Money;
use crate::types::{
    Customer, ExpenseCategory, Invoice, InvoiceKind, InvoiceStatus, Product, Snapshot,
};
use crate::{MONTHLY_ROLLUP_MONTHS, RECENT_INVOICES_LIMIT, TOP_CUSTOMERS_LIMIT};

// =============================================================================
// Dashboard
// =============================================================================

/// Headline figures plus the most recent invoices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sales: Money,
    pub total_received: Money,
    pub total_due: Money,
    pub total_expenses: Money,
    /// Newest first; undated records sort last.
    pub recent_invoices: Vec<Invoice>,
    pub customer_count: usize,
    pub low_stock_count: usize,
}

pub fn dashboard(snapshot: &Snapshot) -> DashboardSummary {
    let invoices = &snapshot.invoices;

    let total_sales: Money = invoices
        .iter()
        .filter(|inv| inv.status.counts_toward_revenue())
        .map(|inv| inv.total)
        .sum();
    let total_received: Money = invoices
        .iter()
        .filter(|inv| inv.is_paid())
        .map(|inv| inv.total)
        .sum();
    let total_due: Money = invoices.iter().map(Invoice::outstanding).sum();

    DashboardSummary {
        total_sales,
        total_received,
        total_due,
        total_expenses: total_expenses(snapshot),
        recent_invoices: newest_first(invoices.iter())
            .into_iter()
            .take(RECENT_INVOICES_LIMIT)
            .cloned()
            .collect(),
        customer_count: snapshot.customers.len(),
        low_stock_count: low_stock(snapshot).len(),
    }
}

/// Sorts by issue date, newest first. Undated records go last and equal
/// dates keep their stored order.
pub fn newest_first<'a>(invoices: impl Iterator<Item = &'a Invoice>) -> Vec<&'a Invoice> {
    let mut sorted: Vec<&Invoice> = invoices.collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

pub fn total_expenses(snapshot: &Snapshot) -> Money {
    snapshot.expenses.iter().map(|e| e.amount).sum()
}

// =============================================================================
// Customers
// =============================================================================

/// Billing figures for one customer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub invoices: usize,
    pub total: Money,
    pub due: Money,
}

/// Stats over non-draft sale invoices whose customer text equals `name`
/// exactly. `due` sums `total - paid` over the ones not yet paid.
pub fn customer_stats(snapshot: &Snapshot, name: &str) -> CustomerStats {
    snapshot
        .invoices_of(InvoiceKind::Sale)
        .filter(|inv| inv.status.counts_toward_revenue() && inv.customer == name)
        .fold(CustomerStats::default(), |mut stats, inv| {
            stats.invoices += 1;
            stats.total += inv.total;
            if !inv.is_paid() {
                stats.due += inv.total - inv.paid;
            }
            stats
        })
}

/// A customer record together with its stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub stats: CustomerStats,
}

pub fn customer_directory(snapshot: &Snapshot) -> Vec<CustomerSummary> {
    snapshot
        .customers
        .iter()
        .map(|customer| CustomerSummary {
            stats: customer_stats(snapshot, &customer.name),
            customer: customer.clone(),
        })
        .collect()
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Money,
    /// Share of the grand total, 0-100; 0 when there are no expenses.
    pub percentage: f64,
}

/// Per-category expense totals, one entry per category in fixed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub categories: Vec<CategoryTotal>,
    pub grand_total: Money,
}

impl ExpenseBreakdown {
    /// Categories worth showing: the ones with a non-zero total.
    pub fn visible(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.categories.iter().filter(|c| !c.total.is_zero())
    }
}

pub fn expense_breakdown(snapshot: &Snapshot) -> ExpenseBreakdown {
    let mut sums: HashMap<ExpenseCategory, Money> = HashMap::new();
    for expense in &snapshot.expenses {
        *sums.entry(expense.category).or_default() += expense.amount;
    }
    let grand_total: Money = sums.values().sum();

    let categories = ExpenseCategory::ALL
        .into_iter()
        .map(|category| {
            let total = sums.get(&category).copied().unwrap_or_default();
            CategoryTotal {
                category,
                total,
                percentage: percentage_of(total, grand_total),
            }
        })
        .collect();

    ExpenseBreakdown {
        categories,
        grand_total,
    }
}

fn percentage_of(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        0.0
    } else {
        part.minor() as f64 / whole.minor() as f64 * 100.0
    }
}

// =============================================================================
// Financial Report
// =============================================================================

/// One `YYYY-MM` row of the monthly rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRow {
    pub month: String,
    pub sales: Money,
    pub received: Money,
    pub expenses: Money,
    /// received − expenses.
    pub profit: Money,
}

/// A customer's line in the top-customers ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRanking {
    pub name: String,
    pub invoices: usize,
    pub total: Money,
    /// Totals of the customer's paid invoices.
    pub received: Money,
    /// total − received.
    pub pending: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub total_revenue: Money,
    pub total_due: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
    /// Ascending by month, at most the last twelve months present.
    pub monthly: Vec<MonthlyRow>,
    pub top_customers: Vec<CustomerRanking>,
    /// Sale invoice count per status; statuses with no invoices are absent.
    pub status_counts: BTreeMap<InvoiceStatus, usize>,
}

pub fn financial_report(snapshot: &Snapshot) -> FinancialReport {
    let sales: Vec<&Invoice> = snapshot.invoices_of(InvoiceKind::Sale).collect();

    let total_revenue: Money = sales
        .iter()
        .filter(|inv| inv.is_paid())
        .map(|inv| inv.total)
        .sum();
    let total_due: Money = sales.iter().map(|inv| inv.outstanding()).sum();
    let total_expenses = total_expenses(snapshot);

    let mut status_counts = BTreeMap::new();
    for invoice in &sales {
        *status_counts.entry(invoice.status).or_insert(0) += 1;
    }

    FinancialReport {
        total_revenue,
        total_due,
        total_expenses,
        net_profit: total_revenue - total_expenses,
        monthly: monthly_rollup(snapshot),
        top_customers: top_customers(snapshot),
        status_counts,
    }
}

/// Sales and expenses grouped by `YYYY-MM`.
///
/// Undated records are skipped, and so are stored dates that are not real
/// calendar days (`2024-02-30`), since those decode as no date.
pub fn monthly_rollup(snapshot: &Snapshot) -> Vec<MonthlyRow> {
    let mut months: BTreeMap<String, MonthlyRow> = BTreeMap::new();

    for invoice in snapshot
        .invoices_of(InvoiceKind::Sale)
        .filter(|inv| inv.status.counts_toward_revenue())
    {
        let Some(date) = invoice.date else { continue };
        let row = month_row(&mut months, date);
        row.sales += invoice.total;
        if invoice.is_paid() {
            row.received += invoice.total;
        }
    }
    for expense in &snapshot.expenses {
        let Some(date) = expense.date else { continue };
        month_row(&mut months, date).expenses += expense.amount;
    }

    let skip = months.len().saturating_sub(MONTHLY_ROLLUP_MONTHS);
    months
        .into_values()
        .skip(skip)
        .map(|mut row| {
            row.profit = row.received - row.expenses;
            row
        })
        .collect()
}

fn month_row(months: &mut BTreeMap<String, MonthlyRow>, date: NaiveDate) -> &mut MonthlyRow {
    let key = date.format("%Y-%m").to_string();
    months.entry(key.clone()).or_insert_with(|| MonthlyRow {
        month: key,
        sales: Money::zero(),
        received: Money::zero(),
        expenses: Money::zero(),
        profit: Money::zero(),
    })
}

/// Non-draft sale invoices grouped by customer name, largest total first.
/// Equal totals keep the order in which the customers first appear.
pub fn top_customers(snapshot: &Snapshot) -> Vec<CustomerRanking> {
    let mut ranking: Vec<CustomerRanking> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for invoice in snapshot
        .invoices_of(InvoiceKind::Sale)
        .filter(|inv| inv.status.counts_toward_revenue() && !inv.customer.is_empty())
    {
        let slot = *index.entry(invoice.customer.as_str()).or_insert_with(|| {
            ranking.push(CustomerRanking {
                name: invoice.customer.clone(),
                invoices: 0,
                total: Money::zero(),
                received: Money::zero(),
                pending: Money::zero(),
            });
            ranking.len() - 1
        });

        let entry = &mut ranking[slot];
        entry.invoices += 1;
        entry.total += invoice.total;
        if invoice.is_paid() {
            entry.received += invoice.total;
        }
    }

    for entry in &mut ranking {
        entry.pending = entry.total - entry.received;
    }
    // stable sort: ties stay in first-seen order
    ranking.sort_by(|a, b| b.total.cmp(&a.total));
    ranking.truncate(TOP_CUSTOMERS_LIMIT);
    ranking
}

// =============================================================================
// Lists & Housekeeping
// =============================================================================

/// Footer figures for any list of invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InvoiceListSummary {
    pub count: usize,
    pub total: Money,
    pub received: Money,
    pub due: Money,
}

pub fn summarize_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> InvoiceListSummary {
    invoices
        .into_iter()
        .fold(InvoiceListSummary::default(), |mut summary, inv| {
            summary.count += 1;
            summary.total += inv.total;
            if inv.is_paid() {
                summary.received += inv.total;
            }
            summary.due += inv.outstanding();
            summary
        })
}

/// Products at or below their low-stock threshold, in catalogue order.
pub fn low_stock(snapshot: &Snapshot) -> Vec<&Product> {
    snapshot.products.iter().filter(|p| p.is_low_stock()).collect()
}

/// Record counts per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DataStats {
    pub invoices: usize,
    pub customers: usize,
    pub products: usize,
    pub expenses: usize,
}

pub fn data_stats(snapshot: &Snapshot) -> DataStats {
    DataStats {
        invoices: snapshot.invoices.len(),
        customers: snapshot.customers.len(),
        products: snapshot.products.len(),
        expenses: snapshot.expenses.len(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
