//! # List Queries
//!
//! Search, filter and sort over the snapshot collections, as used by the
//! list screens. Text search is a case-insensitive substring match; an
//! empty search matches everything.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::money::Money;
use crate::reports::newest_first;
use crate::types::{
    Customer, Expense, ExpenseCategory, Invoice, InvoiceKind, InvoiceStatus, Product, Snapshot,
};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// =============================================================================
// Customers
// =============================================================================

/// Matches name or email ignoring case, or phone as typed.
pub fn search_customers<'a>(snapshot: &'a Snapshot, search: &str) -> Vec<&'a Customer> {
    let needle = search.trim().to_lowercase();
    snapshot
        .customers
        .iter()
        .filter(|c| {
            needle.is_empty()
                || contains_ci(&c.name, &needle)
                || c.phone.contains(search.trim())
                || contains_ci(&c.email, &needle)
        })
        .collect()
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// A to Z, ignoring case.
    #[default]
    Name,
    /// Most expensive first.
    Price,
    /// Most units in stock first.
    Stock,
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ProductSort::Name),
            "price" => Ok(ProductSort::Price),
            "stock" => Ok(ProductSort::Stock),
            other => Err(format!("unknown sort '{}'", other)),
        }
    }
}

/// Matches name, SKU or category; sorted as requested.
pub fn search_products<'a>(
    snapshot: &'a Snapshot,
    search: &str,
    sort: ProductSort,
) -> Vec<&'a Product> {
    let needle = search.trim().to_lowercase();
    let mut products: Vec<&Product> = snapshot
        .products
        .iter()
        .filter(|p| {
            needle.is_empty()
                || contains_ci(&p.name, &needle)
                || contains_ci(&p.sku, &needle)
                || contains_ci(&p.category, &needle)
        })
        .collect();

    products.sort_by(|a, b| match sort {
        ProductSort::Name => compare_names(&a.name, &b.name),
        ProductSort::Price => b.price.cmp(&a.price),
        ProductSort::Stock => b.stock.cmp(&a.stock),
    });
    products
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// =============================================================================
// Invoices
// =============================================================================

/// Filter for the invoice and purchase-bill lists.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub kind: InvoiceKind,
    /// Matches display number or customer name.
    pub search: String,
    /// `None` means all statuses.
    pub status: Option<InvoiceStatus>,
}

impl InvoiceFilter {
    pub fn of_kind(kind: InvoiceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        let needle = self.search.trim().to_lowercase();
        invoice.kind == self.kind
            && self.status.map_or(true, |status| invoice.status == status)
            && (needle.is_empty()
                || contains_ci(&invoice.number, &needle)
                || contains_ci(&invoice.customer, &needle))
    }
}

/// Matching invoices, newest first.
pub fn filter_invoices<'a>(snapshot: &'a Snapshot, filter: &InvoiceFilter) -> Vec<&'a Invoice> {
    newest_first(snapshot.invoices.iter().filter(|inv| filter.matches(inv)))
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// `None` means all categories.
    pub category: Option<ExpenseCategory>,
    /// Matches description or category name.
    pub search: String,
}

/// Filtered expenses, newest first, with their total.
#[derive(Debug, Clone)]
pub struct ExpenseList<'a> {
    pub expenses: Vec<&'a Expense>,
    pub total: Money,
}

pub fn filter_expenses<'a>(snapshot: &'a Snapshot, filter: &ExpenseFilter) -> ExpenseList<'a> {
    let needle = filter.search.trim().to_lowercase();
    let mut expenses: Vec<&Expense> = snapshot
        .expenses
        .iter()
        .filter(|e| filter.category.map_or(true, |category| e.category == category))
        .filter(|e| {
            needle.is_empty()
                || contains_ci(&e.description, &needle)
                || contains_ci(e.category.as_str(), &needle)
        })
        .collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));

    let total = expenses.iter().map(|e| e.amount).sum();
    ExpenseList { expenses, total }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;
    use chrono::NaiveDate;

    fn customer(name: &str, phone: &str, email: &str) -> Customer {
        Customer {
            phone: phone.to_string(),
            email: email.to_string(),
            ..Customer::new(name)
        }
    }

    fn product(name: &str, sku: &str, price: i64, stock: u32) -> Product {
        Product {
            sku: sku.to_string(),
            stock,
            ..Product::new(name, Money::from_minor(price), TaxRate::zero())
        }
    }

    #[test]
    fn test_search_customers() {
        let snapshot = Snapshot {
            customers: vec![
                customer("Ravi Traders", "98450 11111", "ravi@example.com"),
                customer("Meena Stores", "98860 22222", "MEENA@shop.in"),
            ],
            ..Snapshot::default()
        };

        assert_eq!(search_customers(&snapshot, "").len(), 2);
        assert_eq!(search_customers(&snapshot, "RAVI")[0].name, "Ravi Traders");
        assert_eq!(search_customers(&snapshot, "22222")[0].name, "Meena Stores");
        assert_eq!(search_customers(&snapshot, "shop.in")[0].name, "Meena Stores");
        assert!(search_customers(&snapshot, "nobody").is_empty());
    }

    #[test]
    fn test_search_and_sort_products() {
        let snapshot = Snapshot {
            products: vec![
                product("pencil", "PEN-1", 500, 40),
                product("Eraser", "ERS-1", 300, 90),
                product("Notebook", "NB-1", 4_500, 10),
            ],
            ..Snapshot::default()
        };

        let names = |sort| -> Vec<String> {
            search_products(&snapshot, "", sort)
                .into_iter()
                .map(|p| p.name.clone())
                .collect()
        };
        assert_eq!(names(ProductSort::Name), vec!["Eraser", "Notebook", "pencil"]);
        assert_eq!(names(ProductSort::Price), vec!["Notebook", "pencil", "Eraser"]);
        assert_eq!(names(ProductSort::Stock), vec!["Eraser", "pencil", "Notebook"]);

        assert_eq!(search_products(&snapshot, "nb-", ProductSort::Name).len(), 1);
        assert_eq!("Price".parse::<ProductSort>().unwrap(), ProductSort::Price);
    }

    #[test]
    fn test_filter_invoices() {
        let mk = |number: &str, customer: &str, status, kind, day| Invoice {
            number: number.to_string(),
            customer: customer.to_string(),
            status,
            kind,
            date: NaiveDate::from_ymd_opt(2024, 5, day),
            ..Invoice::default()
        };
        let snapshot = Snapshot {
            invoices: vec![
                mk("INV-0001", "Acme", InvoiceStatus::Paid, InvoiceKind::Sale, 1),
                mk("INV-0002", "Beta", InvoiceStatus::Unpaid, InvoiceKind::Sale, 3),
                mk("PUR-0001", "Acme Supplies", InvoiceStatus::Unpaid, InvoiceKind::Purchase, 2),
            ],
            ..Snapshot::default()
        };

        let sales = filter_invoices(&snapshot, &InvoiceFilter::of_kind(InvoiceKind::Sale));
        let numbers: Vec<&str> = sales.iter().map(|i| i.number.as_str()).collect();
        assert_eq!(numbers, vec!["INV-0002", "INV-0001"]);

        let filter = InvoiceFilter {
            search: "acme".to_string(),
            ..InvoiceFilter::of_kind(InvoiceKind::Purchase)
        };
        assert_eq!(filter_invoices(&snapshot, &filter).len(), 1);

        let filter = InvoiceFilter {
            status: Some(InvoiceStatus::Unpaid),
            ..InvoiceFilter::of_kind(InvoiceKind::Sale)
        };
        assert_eq!(filter_invoices(&snapshot, &filter)[0].number, "INV-0002");
    }

    #[test]
    fn test_filter_expenses() {
        let mk = |category, desc: &str, amount, day| Expense {
            category,
            description: desc.to_string(),
            amount: Money::from_minor(amount),
            date: NaiveDate::from_ymd_opt(2024, 6, day),
            ..Expense::default()
        };
        let snapshot = Snapshot {
            expenses: vec![
                mk(ExpenseCategory::Travel, "Cab to client", 800, 2),
                mk(ExpenseCategory::Food, "Team lunch", 2_400, 9),
                mk(ExpenseCategory::Travel, "Train tickets", 1_200, 5),
            ],
            ..Snapshot::default()
        };

        let all = filter_expenses(&snapshot, &ExpenseFilter::default());
        assert_eq!(all.total.minor(), 4_400);
        assert_eq!(all.expenses[0].description, "Team lunch");

        let travel = filter_expenses(
            &snapshot,
            &ExpenseFilter {
                category: Some(ExpenseCategory::Travel),
                ..ExpenseFilter::default()
            },
        );
        assert_eq!(travel.total.minor(), 2_000);
        assert_eq!(travel.expenses[0].description, "Train tickets");

        let searched = filter_expenses(
            &snapshot,
            &ExpenseFilter {
                search: "FOOD".to_string(),
                ..ExpenseFilter::default()
            },
        );
        assert_eq!(searched.expenses.len(), 1);
    }
}
