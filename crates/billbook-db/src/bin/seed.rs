//! # Seed Data Generator
//!
//! Populates a database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./billbook_dev.db with six months of activity (default)
//! cargo run -p billbook-db --bin seed
//!
//! # More history
//! cargo run -p billbook-db --bin seed -- --months 12
//!
//! # Specify database path
//! cargo run -p billbook-db --bin seed -- --db ./data/billbook.db
//! ```
//!
//! ## Generated Data
//! - A business profile
//! - Customers with phone numbers and GSTINs
//! - Products across the standard tax slabs, some below their stock threshold
//! - Sale invoices in every status and a few purchase bills, spread over months
//! - Expenses across every category
//!
//! Everything goes through the same core operations the CLI uses, so the
//! result is indistinguishable from hand-entered data.

use billbook_core::invoice::{mark_paid, new_invoice, save_invoice, SaveAction};
use billbook_core::repository;
use billbook_core::{
    Customer, Expense, ExpenseCategory, InvoiceKind, InvoiceStatus, LineItem, Money, PaymentMode,
    Product, Settings, Snapshot, TaxRate, TAX_RATES,
};
use billbook_db::{Database, DbConfig};
use chrono::{Datelike, Local, Months, NaiveDate};
use std::env;

/// (name, phone, city)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Ravi Traders", "98450 11223", "Bengaluru"),
    ("Meena Textiles", "98860 44556", "Surat"),
    ("Kumar & Sons", "99001 77889", "Chennai"),
    ("Sharma Electricals", "98111 22334", "Delhi"),
    ("Patel Hardware", "97250 66778", "Ahmedabad"),
    ("Joseph Bakers", "94470 99001", "Kochi"),
];

/// (name, unit, price in paise, stock)
const PRODUCTS: &[(&str, &str, i64, u32)] = &[
    ("A4 Paper Ream", "pcs", 32_000, 40),
    ("Gel Pen Blue", "box", 18_000, 3),
    ("Printer Toner", "pcs", 245_000, 6),
    ("Packing Tape", "pcs", 4_500, 120),
    ("Basmati Rice", "kg", 9_500, 2),
    ("Consulting", "hr", 150_000, 0),
    ("Site Visit", "day", 500_000, 0),
    ("LED Bulb 9W", "pcs", 12_000, 75),
];

const STATUSES: &[InvoiceStatus] = &[
    InvoiceStatus::Paid,
    InvoiceStatus::Unpaid,
    InvoiceStatus::Paid,
    InvoiceStatus::Partial,
    InvoiceStatus::Draft,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut months: u32 = 6;
    let mut db_path = String::from("./billbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--months" | "-m" => {
                if i + 1 < args.len() {
                    months = args[i + 1].parse().unwrap_or(6);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("BillBook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --months <N>   Months of history to generate (default: 6)");
                println!("  -d, --db <PATH>    Database file path (default: ./billbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BillBook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Months:   {}", months);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let store = db.snapshots();
    let existing = store.load().await?;
    if !existing.invoices.is_empty() || !existing.customers.is_empty() {
        println!(
            "⚠ Database already has {} invoices and {} customers",
            existing.invoices.len(),
            existing.customers.len()
        );
        println!("  Skipping seed to avoid duplicates.");
        println!("  Run `billbook clear --yes` to start over.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let snapshot = generate(today, months)?;

    store.save(&snapshot).await?;

    println!();
    println!("✓ Customers: {}", snapshot.customers.len());
    println!("✓ Products:  {}", snapshot.products.len());
    println!("✓ Invoices:  {}", snapshot.invoices.len());
    println!("✓ Expenses:  {}", snapshot.expenses.len());
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds the demo snapshot ending at `today`.
fn generate(today: NaiveDate, months: u32) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let mut snapshot = repository::update_settings(
        &Snapshot::default(),
        Settings {
            business_name: "Sharma General Stores".to_string(),
            tax_id: "29AAACS1234F1Z5".to_string(),
            phone: "080 4123 4567".to_string(),
            address: "14, 2nd Cross, Jayanagar, Bengaluru 560011".to_string(),
            email: "accounts@sharmastores.in".to_string(),
            invoice_prefix: "INV".to_string(),
            ..Settings::default()
        },
    );

    for (idx, (name, phone, city)) in CUSTOMERS.iter().enumerate() {
        let customer = Customer {
            phone: phone.to_string(),
            email: format!("{}@example.in", name.split_whitespace().next().unwrap_or("customer").to_lowercase()),
            tax_id: format!("29ABCDE{:04}F1Z{}", 1000 + idx, idx),
            address: city.to_string(),
            ..Customer::new(*name)
        };
        snapshot = repository::create(&snapshot, customer)?.snapshot;
    }

    for (idx, (name, unit, price, stock)) in PRODUCTS.iter().enumerate() {
        let tax = TAX_RATES[idx % TAX_RATES.len()];
        let product = Product {
            sku: format!("SKU-{:03}", idx + 1),
            category: if *stock == 0 { "Services" } else { "Goods" }.to_string(),
            unit: unit.to_string(),
            purchase_price: Money::from_minor(price * 7 / 10),
            stock: *stock,
            ..Product::new(*name, Money::from_minor(*price), TaxRate::from_percentage(tax as f64))
        };
        snapshot = repository::create(&snapshot, product)?.snapshot;
    }

    let mut seq = 0usize;
    for back in (0..months).rev() {
        let month_start = first_of_month(today)
            .checked_sub_months(Months::new(back))
            .unwrap_or(today);

        // four sale invoices a month, one purchase bill every other month
        for n in 0..4 {
            let day = month_start + chrono::Days::new((n * 6 + 2) as u64);
            let day = day.min(today);
            let (customer, _, _) = CUSTOMERS[seq % CUSTOMERS.len()];
            let status = STATUSES[seq % STATUSES.len()];

            let mut invoice = new_invoice(&snapshot, InvoiceKind::Sale, day);
            invoice.customer = customer.to_string();
            invoice = billbook_core::invoice::prefill_customer(&snapshot, invoice);
            invoice.items = (0..1 + seq % 3)
                .map(|k| {
                    let product = &snapshot.products[(seq + k) % snapshot.products.len()];
                    LineItem {
                        quantity: (1 + (seq + k) % 5) as f64,
                        ..LineItem::from_product(product)
                    }
                })
                .collect();
            invoice.discount = if seq % 4 == 0 { Money::from_minor(5_000) } else { Money::zero() };

            let action = match status {
                InvoiceStatus::Draft => Some(SaveAction::Draft.status()),
                InvoiceStatus::Paid => Some(SaveAction::MarkPaid.status()),
                _ => Some(SaveAction::Share.status()),
            };
            let commit = save_invoice(&snapshot, invoice, action)?;
            snapshot = commit.snapshot;

            if status == InvoiceStatus::Paid {
                snapshot = mark_paid(&snapshot, &commit.record.id)?.snapshot;
            } else if status == InvoiceStatus::Partial {
                let mut partial = commit.record;
                partial.paid = Money::from_minor(partial.total.minor() / 2);
                snapshot = save_invoice(&snapshot, partial, Some(InvoiceStatus::Partial))?.snapshot;
            }
            seq += 1;
        }

        if back % 2 == 0 {
            let mut bill = new_invoice(&snapshot, InvoiceKind::Purchase, month_start.min(today));
            bill.customer = "Metro Wholesale".to_string();
            bill.items[0] = LineItem {
                quantity: 20.0,
                ..LineItem::from_product(&snapshot.products[seq % snapshot.products.len()])
            };
            let commit = save_invoice(&snapshot, bill, Some(InvoiceStatus::Paid))?;
            snapshot = mark_paid(&commit.snapshot, &commit.record.id)?.snapshot;
        }

        for (k, category) in ExpenseCategory::ALL.iter().enumerate() {
            if (k + back as usize) % 3 != 0 {
                continue;
            }
            let expense = Expense {
                description: format!("{} for {}", category, month_start.format("%b %Y")),
                payment_mode: PaymentMode::ALL[k % PaymentMode::ALL.len()],
                reference: format!("EXP-{}{:02}-{}", month_start.year(), month_start.month(), k),
                ..Expense::new(
                    (month_start + chrono::Days::new(k as u64 * 3)).min(today),
                    *category,
                    Money::from_minor(50_000 + (k as i64) * 12_500),
                )
            };
            snapshot = repository::create(&snapshot, expense)?.snapshot;
        }
    }

    Ok(snapshot)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
