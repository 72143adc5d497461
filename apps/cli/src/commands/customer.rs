//! # Customer Commands
//!
//! Directory listing with billing stats, plus create/edit/delete.
//!
//! Invoices refer to customers by name text, so renaming or deleting a
//! customer never touches existing invoices.

use billbook_core::query::search_customers;
use billbook_core::reports::{customer_stats, CustomerSummary};
use billbook_core::{repository, Customer, Money};
use clap::{Args, Subcommand};
use comfy_table::{Cell, CellAlignment};
use tracing::{debug, info};

use super::{or_dash, parse_money, require_yes, resolve_id, short_id, table, Formatter, Output};
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// List customers with invoice count, billed total and amount due
    List {
        /// Match name, email or phone
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Add a customer
    Add {
        name: String,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Edit a customer (only the given fields change)
    Edit {
        /// Customer id or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Delete a customer (their invoices are kept)
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct CustomerFields {
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// GSTIN
    #[arg(long)]
    pub gst: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, value_parser = parse_money)]
    pub opening_balance: Option<Money>,
}

impl CustomerFields {
    fn apply(self, customer: &mut Customer) {
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(gst) = self.gst {
            customer.tax_id = gst;
        }
        if let Some(address) = self.address {
            customer.address = address;
        }
        if let Some(balance) = self.opening_balance {
            customer.opening_balance = balance;
        }
    }
}

pub async fn run(cmd: CustomerCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        CustomerCommand::List { search } => list(db, config, &search),
        CustomerCommand::Add { name, fields } => {
            let mut customer = Customer::new(name);
            fields.apply(&mut customer);

            let commit = repository::create(db.snapshot(), customer)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, "Customer added");
            Ok(Output::message(format!(
                "Added customer {} ({})",
                record.name,
                short_id(&record.id)
            ))
            .persisted(saved))
        }
        CustomerCommand::Edit { id, name, fields } => {
            let id = resolve_id("Customer", &id, db.snapshot().customers.iter().map(|c| c.id.as_str()))?;
            let mut customer = repository::get::<Customer>(db.snapshot(), &id)?.clone();
            if let Some(name) = name {
                customer.name = name;
            }
            fields.apply(&mut customer);

            let commit = repository::update(db.snapshot(), customer)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            debug!(id = %record.id, "Customer updated");
            Ok(Output::message(format!("Updated customer {}", record.name)).persisted(saved))
        }
        CustomerCommand::Delete { id, yes } => {
            let id = resolve_id("Customer", &id, db.snapshot().customers.iter().map(|c| c.id.as_str()))?;
            require_yes(yes, "delete a customer")?;

            let commit = repository::delete::<Customer>(db.snapshot(), &id)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, "Customer deleted");
            Ok(Output::message(format!("Deleted customer {}", record.name)).persisted(saved))
        }
    }
}

fn list(db: &DbState, config: &ConfigState, search: &str) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);

    let rows: Vec<CustomerSummary> = search_customers(snapshot, search)
        .into_iter()
        .map(|customer| CustomerSummary {
            stats: customer_stats(snapshot, &customer.name),
            customer: customer.clone(),
        })
        .collect();

    if rows.is_empty() {
        let text = if snapshot.customers.is_empty() {
            "No customers yet. Add one with `billbook customer add <name>`."
        } else {
            "No customers match."
        };
        return Output::data(text, &rows);
    }

    let mut out = table(&["ID", "Name", "Phone", "GSTIN", "Invoices", "Total", "Due"]);
    for row in &rows {
        let c = &row.customer;
        out.add_row(vec![
            Cell::new(short_id(&c.id)),
            Cell::new(&c.name),
            Cell::new(or_dash(&c.phone)),
            Cell::new(or_dash(&c.tax_id)),
            Cell::new(row.stats.invoices).set_alignment(CellAlignment::Right),
            Cell::new(fmt.money(row.stats.total)).set_alignment(CellAlignment::Right),
            Cell::new(fmt.money(row.stats.due)).set_alignment(CellAlignment::Right),
        ]);
    }

    Output::data(format!("{out}\n{} customer(s)", rows.len()), &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NOT_SAVED_WARNING;
    use crate::error::ErrorCode;
    use billbook_core::invoice::save_invoice;
    use billbook_core::{Invoice, LineItem, TaxRate};
    use billbook_db::{Database, DbConfig};

    async fn state() -> DbState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DbState::open(db).await.unwrap()
    }

    async fn add(db: &mut DbState, name: &str) -> String {
        let fields = CustomerFields {
            phone: Some("98450 11223".into()),
            ..CustomerFields::default()
        };
        run(CustomerCommand::Add { name: name.into(), fields }, db, &ConfigState::default())
            .await
            .unwrap();
        db.snapshot().customers.last().unwrap().id.clone()
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let mut db = state().await;
        add(&mut db, "Acme Traders").await;
        add(&mut db, "Zen Stores").await;

        let out = run(
            CustomerCommand::List { search: "acme".into() },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap();

        assert!(out.text().contains("Acme Traders"));
        assert!(!out.text().contains("Zen Stores"));
        assert!(out.text().contains("1 customer(s)"));
    }

    #[tokio::test]
    async fn test_failed_save_is_reported() {
        let mut db = state().await;
        db.inner().close().await;

        let out = run(
            CustomerCommand::Add { name: "Acme".into(), fields: CustomerFields::default() },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap();

        assert!(out.text().starts_with("Added customer Acme"));
        assert!(out.text().contains(NOT_SAVED_WARNING));
        assert_eq!(db.snapshot().customers.len(), 1);
    }

    #[tokio::test]
    async fn test_add_requires_name() {
        let mut db = state().await;
        let err = run(
            CustomerCommand::Add { name: "  ".into(), fields: CustomerFields::default() },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_edit_changes_only_given_fields() {
        let mut db = state().await;
        let id = add(&mut db, "Acme").await;

        let fields = CustomerFields {
            email: Some("acme@example.in".into()),
            ..CustomerFields::default()
        };
        run(
            CustomerCommand::Edit { id: id[..6].to_string(), name: None, fields },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap();

        let customer = &db.snapshot().customers[0];
        assert_eq!(customer.email, "acme@example.in");
        assert_eq!(customer.phone, "98450 11223");
        assert_eq!(customer.name, "Acme");
    }

    #[tokio::test]
    async fn test_delete_needs_yes_and_keeps_invoices() {
        let mut db = state().await;
        let id = add(&mut db, "Acme").await;

        let invoice = Invoice {
            customer: "Acme".into(),
            items: vec![LineItem::new("Audit", 1.0, Money::from_minor(10_000), TaxRate::zero())],
            ..Invoice::default()
        };
        let next = save_invoice(db.snapshot(), invoice, None).unwrap().snapshot;
        assert!(db.commit(next).await);

        let err = run(
            CustomerCommand::Delete { id: id.clone(), yes: false },
            &mut db,
            &ConfigState::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);
        assert_eq!(db.snapshot().customers.len(), 1);

        run(CustomerCommand::Delete { id, yes: true }, &mut db, &ConfigState::default())
            .await
            .unwrap();
        assert!(db.snapshot().customers.is_empty());
        assert_eq!(db.snapshot().invoices.len(), 1);
        assert_eq!(db.snapshot().invoices[0].customer, "Acme");
    }
}
