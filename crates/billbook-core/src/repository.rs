//! # Snapshot Repository
//!
//! CRUD over the snapshot collections, keyed by generated identifiers.
//!
//! ## Write Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   &Snapshot ──► create / update / delete ──► Commit { snapshot, record }│
//! │       │                    │                                            │
//! │       │                    └── Err(CoreError): no new snapshot          │
//! │       └── never mutated                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller persists `commit.snapshot` and only then adopts it as its
//! current state.
//!
//! ## Usage
//! ```rust
//! use billbook_core::repository;
//! use billbook_core::types::{Customer, Snapshot};
//!
//! let snapshot = Snapshot::default();
//! let commit = repository::create(&snapshot, Customer::new("Ravi")).unwrap();
//!
//! assert!(snapshot.customers.is_empty());
//! assert_eq!(commit.snapshot.customers.len(), 1);
//! assert!(!commit.record.id.is_empty());
//! ```

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Customer, Expense, Invoice, Product, Settings, Snapshot};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Record Trait
// =============================================================================

/// A record stored in one of the snapshot collections.
pub trait Record: Clone {
    /// Entity name used in not-found errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Write-boundary validation.
    fn validate(&self) -> ValidationResult<()>;

    /// Normalization applied before validation (derived fields, trimming).
    fn prepare(&mut self) {}

    fn collection(snapshot: &Snapshot) -> &[Self];

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

impl Record for Customer {
    const ENTITY: &'static str = "Customer";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_customer(self)
    }

    fn prepare(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.customers
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.customers
    }
}

impl Record for Product {
    const ENTITY: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_product(self)
    }

    fn prepare(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.products
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.products
    }
}

impl Record for Invoice {
    const ENTITY: &'static str = "Invoice";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_invoice(self)
    }

    /// Stored totals are derived; never trust the incoming ones.
    fn prepare(&mut self) {
        self.customer = self.customer.trim().to_string();
        self.recompute_totals();
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.invoices
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.invoices
    }
}

impl Record for Expense {
    const ENTITY: &'static str = "Expense";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_expense(self)
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.expenses
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        &mut snapshot.expenses
    }
}

// =============================================================================
// Commit
// =============================================================================

/// Result of a successful write: the replacement snapshot plus the record as
/// stored (with its assigned id and derived fields).
#[derive(Debug, Clone)]
pub struct Commit<T> {
    pub snapshot: Snapshot,
    pub record: T,
}

// =============================================================================
// Operations
// =============================================================================

/// Generates an id not already used in the record's collection.
pub fn fresh_id<T: Record>(snapshot: &Snapshot) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !T::collection(snapshot).iter().any(|r| r.id() == id) {
            return id;
        }
    }
}

pub fn find<'a, T: Record>(snapshot: &'a Snapshot, id: &str) -> Option<&'a T> {
    T::collection(snapshot).iter().find(|r| r.id() == id)
}

/// Like [`find`], but a missing record is an error.
pub fn get<'a, T: Record>(snapshot: &'a Snapshot, id: &str) -> CoreResult<&'a T> {
    find(snapshot, id).ok_or_else(|| CoreError::not_found(T::ENTITY, id))
}

/// Appends a record under a fresh id. Any incoming id is ignored.
pub fn create<T: Record>(snapshot: &Snapshot, mut record: T) -> CoreResult<Commit<T>> {
    record.prepare();
    record.validate()?;
    record.set_id(fresh_id::<T>(snapshot));

    let mut next = snapshot.clone();
    T::collection_mut(&mut next).push(record.clone());
    Ok(Commit {
        snapshot: next,
        record,
    })
}

/// Replaces the record with the same id, keeping its position.
pub fn update<T: Record>(snapshot: &Snapshot, mut record: T) -> CoreResult<Commit<T>> {
    let index = position::<T>(snapshot, record.id())?;
    record.prepare();
    record.validate()?;

    let mut next = snapshot.clone();
    T::collection_mut(&mut next)[index] = record.clone();
    Ok(Commit {
        snapshot: next,
        record,
    })
}

/// Removes a record by id and returns it.
///
/// Deleting a customer leaves every invoice that names it untouched.
pub fn delete<T: Record>(snapshot: &Snapshot, id: &str) -> CoreResult<Commit<T>> {
    let index = position::<T>(snapshot, id)?;

    let mut next = snapshot.clone();
    let record = T::collection_mut(&mut next).remove(index);
    Ok(Commit {
        snapshot: next,
        record,
    })
}

/// Overwrites the settings record.
pub fn update_settings(snapshot: &Snapshot, settings: Settings) -> Snapshot {
    Snapshot {
        settings,
        ..snapshot.clone()
    }
}

/// Applies a signed stock delta to a product; stock floors at zero.
pub fn adjust_stock(snapshot: &Snapshot, id: &str, delta: i64) -> CoreResult<Commit<Product>> {
    let mut product = get::<Product>(snapshot, id)?.clone();
    product.stock = product.adjusted_stock(delta);
    update(snapshot, product)
}

fn position<T: Record>(snapshot: &Snapshot, id: &str) -> CoreResult<usize> {
    T::collection(snapshot)
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| CoreError::not_found(T::ENTITY, id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{ExpenseCategory, LineItem, TaxRate};
    use chrono::NaiveDate;

    fn with_customer(name: &str) -> (Snapshot, Customer) {
        let commit = create(&Snapshot::default(), Customer::new(name)).unwrap();
        (commit.snapshot, commit.record)
    }

    fn invoice_for(customer: &str) -> Invoice {
        Invoice {
            customer: customer.to_string(),
            items: vec![LineItem::new("Work", 2.0, Money::from_minor(10_000), TaxRate::from_percentage(18.0))],
            ..Invoice::default()
        }
    }

    #[test]
    fn test_create_assigns_fresh_id() {
        let mut customer = Customer::new("  Ravi  ");
        customer.id = "caller-supplied".to_string();

        let commit = create(&Snapshot::default(), customer).unwrap();
        assert_ne!(commit.record.id, "caller-supplied");
        assert_eq!(commit.record.name, "Ravi");
        assert_eq!(commit.snapshot.customers, vec![commit.record.clone()]);
    }

    #[test]
    fn test_create_rejects_invalid_without_touching_snapshot() {
        let (snapshot, _) = with_customer("Ravi");
        let before = snapshot.clone();

        let result = create(&snapshot, Customer::new(""));
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (snapshot, customer) = with_customer("Ravi");
        let snapshot = create(&snapshot, Customer::new("Meena")).unwrap().snapshot;

        let renamed = Customer {
            name: "Ravi Kumar".to_string(),
            ..customer.clone()
        };
        let commit = update(&snapshot, renamed).unwrap();

        assert_eq!(commit.snapshot.customers[0].name, "Ravi Kumar");
        assert_eq!(commit.snapshot.customers[0].id, customer.id);
        assert_eq!(commit.snapshot.customers[1].name, "Meena");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let result = update(&Snapshot::default(), Customer::new("Ghost"));
        assert!(matches!(result, Err(CoreError::NotFound { entity: "Customer", .. })));
    }

    #[test]
    fn test_delete() {
        let (snapshot, customer) = with_customer("Ravi");
        let commit = delete::<Customer>(&snapshot, &customer.id).unwrap();
        assert!(commit.snapshot.customers.is_empty());
        assert_eq!(commit.record.name, "Ravi");

        assert!(delete::<Customer>(&commit.snapshot, &customer.id).is_err());
    }

    #[test]
    fn test_customer_changes_never_touch_invoices() {
        let (snapshot, customer) = with_customer("Ravi");
        let snapshot = create(&snapshot, invoice_for("Ravi")).unwrap().snapshot;
        let invoices_before = snapshot.invoices.clone();

        let renamed = Customer {
            name: "Ravi Kumar".to_string(),
            ..customer.clone()
        };
        let snapshot = update(&snapshot, renamed).unwrap().snapshot;
        assert_eq!(snapshot.invoices, invoices_before);

        let snapshot = delete::<Customer>(&snapshot, &customer.id).unwrap().snapshot;
        assert_eq!(snapshot.invoices, invoices_before);
        assert_eq!(snapshot.invoices[0].customer, "Ravi");
    }

    #[test]
    fn test_invoice_totals_recomputed_on_write() {
        let mut invoice = invoice_for("Acme");
        invoice.total = Money::from_minor(1);

        let commit = create(&Snapshot::default(), invoice).unwrap();
        assert_eq!(commit.record.sub_total.minor(), 20_000);
        assert_eq!(commit.record.tax_total.minor(), 3_600);
        assert_eq!(commit.record.total.minor(), 23_600);
    }

    #[test]
    fn test_expense_requires_positive_amount() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let expense = Expense::new(date, ExpenseCategory::Travel, Money::zero());
        assert!(create(&Snapshot::default(), expense).is_err());
    }

    #[test]
    fn test_adjust_stock_floors_at_zero() {
        let product = Product {
            stock: 3,
            ..Product::new("Pen", Money::from_minor(1_000), TaxRate::zero())
        };
        let commit = create(&Snapshot::default(), product).unwrap();
        let id = commit.record.id.clone();

        let up = adjust_stock(&commit.snapshot, &id, 7).unwrap();
        assert_eq!(up.record.stock, 10);

        let down = adjust_stock(&up.snapshot, &id, -25).unwrap();
        assert_eq!(down.record.stock, 0);
        assert_eq!(down.snapshot.products[0].stock, 0);

        assert!(adjust_stock(&down.snapshot, "missing", 1).is_err());
    }

    #[test]
    fn test_update_settings_overwrites() {
        let settings = Settings {
            business_name: "Sharma Stores".to_string(),
            ..Settings::default()
        };
        let snapshot = update_settings(&Snapshot::default(), settings.clone());
        assert_eq!(snapshot.settings, settings);
    }

    #[test]
    fn test_find_and_get() {
        let (snapshot, customer) = with_customer("Ravi");
        assert_eq!(find::<Customer>(&snapshot, &customer.id), Some(&customer));
        assert!(find::<Customer>(&snapshot, "nope").is_none());
        assert!(get::<Customer>(&snapshot, "nope").is_err());
    }
}
