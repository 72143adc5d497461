//! # Expense Commands

use billbook_core::query::{filter_expenses, ExpenseFilter};
use billbook_core::{repository, Expense, ExpenseCategory, Money, PaymentMode};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use comfy_table::{Cell, CellAlignment};
use tracing::{debug, info};

use super::{format_date, or_dash, parse_money, require_yes, resolve_id, short_id, table, Formatter, Output};
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// List expenses, newest first, with the filtered total
    List {
        /// A category name, or "all"
        #[arg(long, default_value = "all")]
        category: String,
        /// Match description or category
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Record an expense
    Add {
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Rent, Salaries, Utilities, Transport, Marketing, Office, Purchase or Misc
        #[arg(long, default_value = "Office")]
        category: ExpenseCategory,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    /// Edit an expense (only the given fields change)
    Edit {
        /// Expense id or unique prefix
        id: String,
        #[arg(long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(long)]
        category: Option<ExpenseCategory>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    /// Delete an expense
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExpenseFields {
    #[arg(long = "desc")]
    pub description: Option<String>,
    /// Cash, Card, UPI, Cheque or Bank Transfer
    #[arg(long)]
    pub pay_mode: Option<PaymentMode>,
    /// Bill number, cheque number or transaction id
    #[arg(long)]
    pub reference: Option<String>,
}

impl ExpenseFields {
    fn apply(self, expense: &mut Expense) {
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(mode) = self.pay_mode {
            expense.payment_mode = mode;
        }
        if let Some(reference) = self.reference {
            expense.reference = reference;
        }
    }
}

/// `all` (or empty) means no category filter.
fn category_filter(input: &str) -> ApiResult<Option<ExpenseCategory>> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    input.parse().map(Some).map_err(ApiError::validation)
}

pub async fn run(cmd: ExpenseCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        ExpenseCommand::List { category, search } => {
            let filter = ExpenseFilter {
                category: category_filter(&category)?,
                search,
            };
            list(db, config, &filter)
        }
        ExpenseCommand::Add { amount, category, date, fields } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut expense = Expense::new(date, category, amount);
            fields.apply(&mut expense);

            let commit = repository::create(db.snapshot(), expense)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, category = %record.category, "Expense recorded");
            let fmt = Formatter::new(config, &db.snapshot().settings);
            Ok(Output::message(format!(
                "Recorded {} {} expense ({})",
                fmt.money(record.amount),
                record.category,
                short_id(&record.id)
            ))
            .persisted(saved))
        }
        ExpenseCommand::Edit { id, amount, category, date, fields } => {
            let id = resolve_id("Expense", &id, db.snapshot().expenses.iter().map(|e| e.id.as_str()))?;
            let mut expense = repository::get::<Expense>(db.snapshot(), &id)?.clone();
            if let Some(amount) = amount {
                expense.amount = amount;
            }
            if let Some(category) = category {
                expense.category = category;
            }
            if let Some(date) = date {
                expense.date = Some(date);
            }
            fields.apply(&mut expense);

            let commit = repository::update(db.snapshot(), expense)?;
            let saved = db.commit(commit.snapshot).await;

            debug!(id = %commit.record.id, "Expense updated");
            Ok(Output::message("Updated expense").persisted(saved))
        }
        ExpenseCommand::Delete { id, yes } => {
            let id = resolve_id("Expense", &id, db.snapshot().expenses.iter().map(|e| e.id.as_str()))?;
            require_yes(yes, "delete an expense")?;

            let commit = repository::delete::<Expense>(db.snapshot(), &id)?;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %commit.record.id, "Expense deleted");
            Ok(Output::message("Deleted expense").persisted(saved))
        }
    }
}

fn list(db: &DbState, config: &ConfigState, filter: &ExpenseFilter) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);
    let listed = filter_expenses(snapshot, filter);

    if listed.expenses.is_empty() {
        return Output::data("No expenses found.", &listed.expenses);
    }

    let mut out = table(&["ID", "Date", "Category", "Description", "Paid Via", "Amount"]);
    for e in &listed.expenses {
        out.add_row(vec![
            Cell::new(short_id(&e.id)),
            Cell::new(format_date(e.date)),
            Cell::new(e.category),
            Cell::new(or_dash(&e.description)),
            Cell::new(e.payment_mode),
            Cell::new(fmt.money(e.amount)).set_alignment(CellAlignment::Right),
        ]);
    }

    Output::data(
        format!("{out}\n{} expense(s) · total {}", listed.expenses.len(), fmt.money(listed.total)),
        &listed.expenses,
    )
}
