//! # Dashboard & Report Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dashboard ──► DashboardSummary (all invoices, both kinds)              │
//! │                + low-stock products                                     │
//! │                                                                         │
//! │  report    ──► FinancialReport (sale invoices only)                     │
//! │                + ExpenseBreakdown                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::reports::{
    dashboard, expense_breakdown, financial_report, low_stock, ExpenseBreakdown, FinancialReport,
};
use billbook_core::InvoiceStatus;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Color};
use serde::Serialize;
use std::fmt::Write as _;

use super::{format_date, or_dash, table, Formatter, Output};
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

pub fn run_dashboard(db: &DbState, config: &ConfigState) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);
    let summary = dashboard(snapshot);

    let mut text = String::new();
    let _ = writeln!(text, "{}", snapshot.settings.business_name);
    let _ = writeln!(text);

    let mut figures = table(&["Total Sales", "Received", "Due", "Expenses", "Customers", "Low Stock"]);
    figures.add_row(vec![
        Cell::new(fmt.money(summary.total_sales)),
        Cell::new(fmt.money(summary.total_received)).fg(Color::Green),
        Cell::new(fmt.money(summary.total_due)).fg(Color::Red),
        Cell::new(fmt.money(summary.total_expenses)),
        Cell::new(summary.customer_count),
        Cell::new(summary.low_stock_count),
    ]);
    let _ = writeln!(text, "{figures}");

    if summary.recent_invoices.is_empty() {
        let _ = write!(text, "\nNo invoices yet.");
    } else {
        let mut recent = table(&["Number", "Date", "Customer", "Total", "Status"]);
        for inv in &summary.recent_invoices {
            recent.add_row(vec![
                Cell::new(&inv.number),
                Cell::new(format_date(inv.date)),
                Cell::new(or_dash(&inv.customer)),
                Cell::new(fmt.money(inv.total)).set_alignment(CellAlignment::Right),
                Cell::new(inv.status),
            ]);
        }
        let _ = write!(text, "\nRecent invoices\n{recent}");
    }

    let low = low_stock(snapshot);
    if !low.is_empty() {
        let names: Vec<String> = low
            .iter()
            .map(|p| format!("{} ({} {})", p.name, p.stock, p.unit))
            .collect();
        let _ = write!(text, "\n\nLow stock: {}", names.join(", "));
    }

    Output::data(text, &summary)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    #[serde(flatten)]
    report: &'a FinancialReport,
    expenses: &'a ExpenseBreakdown,
}

pub fn run_report(db: &DbState, config: &ConfigState) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);
    let report = financial_report(snapshot);
    let breakdown = expense_breakdown(snapshot);

    let mut text = String::new();

    let mut headline = table(&["Revenue", "Due", "Expenses", "Net Profit"]);
    let profit = Cell::new(fmt.money(report.net_profit));
    let profit = if report.net_profit.is_negative() {
        profit.fg(Color::Red)
    } else {
        profit.fg(Color::Green)
    };
    headline.add_row(vec![
        Cell::new(fmt.money(report.total_revenue)),
        Cell::new(fmt.money(report.total_due)),
        Cell::new(fmt.money(report.total_expenses)),
        profit,
    ]);
    let _ = writeln!(text, "{headline}");

    if !report.monthly.is_empty() {
        let mut monthly = table(&["Month", "Sales", "Received", "Expenses", "Profit"]);
        for row in &report.monthly {
            monthly.add_row(vec![
                Cell::new(month_label(&row.month)),
                Cell::new(fmt.money(row.sales)).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.received)).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.expenses)).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.profit)).set_alignment(CellAlignment::Right),
            ]);
        }
        let _ = writeln!(text, "\nMonthly\n{monthly}");
    }

    if !report.top_customers.is_empty() {
        let mut top = table(&["Customer", "Invoices", "Total", "Received", "Pending"]);
        for row in &report.top_customers {
            top.add_row(vec![
                Cell::new(&row.name),
                Cell::new(row.invoices).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.total)).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.received)).set_alignment(CellAlignment::Right),
                Cell::new(fmt.money(row.pending)).set_alignment(CellAlignment::Right),
            ]);
        }
        let _ = writeln!(text, "\nTop customers\n{top}");
    }

    let visible: Vec<_> = breakdown.visible().collect();
    if !visible.is_empty() {
        let mut expenses = table(&["Category", "Total", "Share"]);
        for row in visible {
            expenses.add_row(vec![
                Cell::new(row.category),
                Cell::new(fmt.money(row.total)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", row.percentage)).set_alignment(CellAlignment::Right),
            ]);
        }
        let _ = writeln!(text, "\nExpenses by category\n{expenses}");
    }

    let counts: Vec<String> = InvoiceStatus::ALL
        .iter()
        .map(|status| format!("{} {}", report.status_counts.get(status).copied().unwrap_or(0), status))
        .collect();
    let _ = write!(text, "\nInvoices: {}", counts.join(" · "));

    Output::data(
        text,
        &ReportJson {
            report: &report,
            expenses: &breakdown,
        },
    )
}

/// `2024-04` → `Apr 2024`.
fn month_label(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::invoice::{mark_paid, save_invoice};
    use billbook_core::{repository, Expense, ExpenseCategory, Invoice, LineItem, Money, Snapshot, TaxRate};
    use billbook_db::{Database, DbConfig};

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn sale(snapshot: &Snapshot, customer: &str, on: Option<NaiveDate>, amount: i64) -> (Snapshot, String) {
        let invoice = Invoice {
            customer: customer.into(),
            date: on,
            items: vec![LineItem::new("Work", 1.0, Money::from_minor(amount), TaxRate::zero())],
            ..Invoice::default()
        };
        let commit = save_invoice(snapshot, invoice, None).unwrap();
        (commit.snapshot, commit.record.id)
    }

    async fn populated() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut state = DbState::open(db).await.unwrap();

        let (s, first) = sale(state.snapshot(), "Acme", date(2024, 1, 10), 100_000);
        let (s, _) = sale(&s, "Zen", date(2024, 3, 2), 50_000);
        let s = mark_paid(&s, &first).unwrap().snapshot;
        let s = repository::create(
            &s,
            Expense::new(date(2024, 3, 5).unwrap(), ExpenseCategory::Rent, Money::from_minor(30_000)),
        )
        .unwrap()
        .snapshot;

        assert!(state.commit(s).await);
        state
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2024-04"), "Apr 2024");
        assert_eq!(month_label("garbage"), "garbage");
    }

    #[tokio::test]
    async fn test_dashboard() {
        let db = populated().await;
        let out = run_dashboard(&db, &ConfigState::default()).unwrap();
        let text = out.text();
        assert!(text.contains("₹1,500.00"));
        assert!(text.contains("Recent invoices"));

        let json = match out {
            Output::Data { json, .. } => json,
            Output::Message(_) => panic!("expected data"),
        };
        assert_eq!(json["totalSales"], 1500);
        assert_eq!(json["totalReceived"], 1000);
        assert_eq!(json["totalDue"], 500);
    }

    #[tokio::test]
    async fn test_report() {
        let db = populated().await;
        let out = run_report(&db, &ConfigState::default()).unwrap();
        let text = out.text();
        assert!(text.contains("Jan 2024"));
        assert!(text.contains("Mar 2024"));
        assert!(text.contains("Rent"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("Invoices: 0 draft · 1 unpaid · 0 partial · 1 paid"));

        let json = match out {
            Output::Data { json, .. } => json,
            Output::Message(_) => panic!("expected data"),
        };
        assert_eq!(json["netProfit"], 700);
        assert_eq!(json["monthly"].as_array().unwrap().len(), 2);
        assert_eq!(json["topCustomers"][0]["name"], "Acme");
        assert_eq!(json["expenses"]["grandTotal"], 300);
    }
}
