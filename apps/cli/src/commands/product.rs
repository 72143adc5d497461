//! # Product Commands
//!
//! Catalogue listing, CRUD and manual stock adjustment.
//!
//! Stock only moves through `product stock` or an edit; issuing invoices
//! never decrements it.

use billbook_core::query::{search_products, ProductSort};
use billbook_core::{repository, Money, Product, TaxRate, UNITS};
use clap::{Args, Subcommand};
use comfy_table::{Cell, CellAlignment, Color};
use tracing::{debug, info, warn};

use super::{or_dash, parse_money, parse_tax, require_yes, resolve_id, short_id, table, Formatter, Output};
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products
    List {
        /// Match name, SKU or category
        #[arg(short, long, default_value = "")]
        search: String,
        /// name, price or stock
        #[arg(long, default_value = "name")]
        sort: ProductSort,
        /// Only products at or below their low-stock threshold
        #[arg(long)]
        low_stock: bool,
    },
    /// Add a product
    Add {
        name: String,
        #[arg(long, value_parser = parse_money)]
        price: Money,
        /// GST percentage: 0, 5, 12, 18 or 28
        #[arg(long, value_parser = parse_tax, default_value = "0")]
        tax: TaxRate,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Edit a product (only the given fields change)
    Edit {
        /// Product id or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_money)]
        price: Option<Money>,
        #[arg(long, value_parser = parse_tax)]
        tax: Option<TaxRate>,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Adjust stock by a signed amount (stock never goes below zero)
    Stock {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProductFields {
    #[arg(long)]
    pub sku: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Unit of measure (pcs, kg, hr, ...)
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long, value_parser = parse_money)]
    pub purchase_price: Option<Money>,
    #[arg(long)]
    pub stock: Option<u32>,
    /// Low-stock threshold (0 means the default of 5)
    #[arg(long)]
    pub min_stock: Option<u32>,
}

impl ProductFields {
    fn apply(self, product: &mut Product) {
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(unit) = self.unit {
            if !UNITS.contains(&unit.as_str()) {
                warn!(unit = %unit, "Unusual unit of measure");
            }
            product.unit = unit;
        }
        if let Some(price) = self.purchase_price {
            product.purchase_price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(min_stock) = self.min_stock {
            product.min_stock = min_stock;
        }
    }
}

fn product_id(db: &DbState, prefix: &str) -> ApiResult<String> {
    resolve_id("Product", prefix, db.snapshot().products.iter().map(|p| p.id.as_str()))
}

pub async fn run(cmd: ProductCommand, db: &mut DbState, config: &ConfigState) -> ApiResult<Output> {
    match cmd {
        ProductCommand::List { search, sort, low_stock } => list(db, config, &search, sort, low_stock),
        ProductCommand::Add { name, price, tax, fields } => {
            let mut product = Product::new(name, price, tax);
            fields.apply(&mut product);

            let commit = repository::create(db.snapshot(), product)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, "Product added");
            Ok(Output::message(format!(
                "Added product {} ({})",
                record.name,
                short_id(&record.id)
            ))
            .persisted(saved))
        }
        ProductCommand::Edit { id, name, price, tax, fields } => {
            let id = product_id(db, &id)?;
            let mut product = repository::get::<Product>(db.snapshot(), &id)?.clone();
            if let Some(name) = name {
                product.name = name;
            }
            if let Some(price) = price {
                product.price = price;
            }
            if let Some(tax) = tax {
                product.tax_rate = tax;
            }
            fields.apply(&mut product);

            let commit = repository::update(db.snapshot(), product)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            debug!(id = %record.id, "Product updated");
            Ok(Output::message(format!("Updated product {}", record.name)).persisted(saved))
        }
        ProductCommand::Delete { id, yes } => {
            let id = product_id(db, &id)?;
            require_yes(yes, "delete a product")?;

            let commit = repository::delete::<Product>(db.snapshot(), &id)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, "Product deleted");
            Ok(Output::message(format!("Deleted product {}", record.name)).persisted(saved))
        }
        ProductCommand::Stock { id, delta } => {
            let id = product_id(db, &id)?;
            let commit = repository::adjust_stock(db.snapshot(), &id, delta)?;
            let record = commit.record;
            let saved = db.commit(commit.snapshot).await;

            info!(id = %record.id, delta, stock = record.stock, "Stock adjusted");
            let mut text = format!("{}: stock now {} {}", record.name, record.stock, record.unit);
            if record.is_low_stock() {
                text.push_str(" (low stock)");
            }
            Ok(Output::message(text).persisted(saved))
        }
    }
}

fn list(
    db: &DbState,
    config: &ConfigState,
    search: &str,
    sort: ProductSort,
    low_stock: bool,
) -> ApiResult<Output> {
    let snapshot = db.snapshot();
    let fmt = Formatter::new(config, &snapshot.settings);

    let products: Vec<&Product> = search_products(snapshot, search, sort)
        .into_iter()
        .filter(|p| !low_stock || p.is_low_stock())
        .collect();

    if products.is_empty() {
        let text = if snapshot.products.is_empty() {
            "No products yet. Add one with `billbook product add <name> --price <amount>`."
        } else {
            "No products match."
        };
        return Output::data(text, &products);
    }

    let mut out = table(&["ID", "Name", "SKU", "Category", "Price", "Tax", "Stock"]);
    for p in &products {
        let stock = Cell::new(format!("{} {}", p.stock, p.unit)).set_alignment(CellAlignment::Right);
        let stock = if p.is_low_stock() { stock.fg(Color::Red) } else { stock };

        out.add_row(vec![
            Cell::new(short_id(&p.id)),
            Cell::new(&p.name),
            Cell::new(or_dash(&p.sku)),
            Cell::new(or_dash(&p.category)),
            Cell::new(fmt.money(p.price)).set_alignment(CellAlignment::Right),
            Cell::new(p.tax_rate).set_alignment(CellAlignment::Right),
            stock,
        ]);
    }

    let low = products.iter().filter(|p| p.is_low_stock()).count();
    Output::data(
        format!("{out}\n{} product(s), {} low on stock", products.len(), low),
        &products,
    )
}
