//! # Validation Module
//!
//! Write-boundary validation for BillBook records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI args ──► record ──► validate_*() ──► repository write ──► store   │
//! │                               │                                         │
//! │                               └── Err(ValidationError): snapshot kept   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding stored data is lenient; writing new data is strict. These
//! validators run on every create/update/save and the first failure wins.
//!
//! ## Usage
//! ```rust
//! use billbook_core::types::Customer;
//! use billbook_core::validation::validate_customer;
//!
//! assert!(validate_customer(&Customer::new("Ravi Traders")).is_ok());
//! assert!(validate_customer(&Customer::new("   ")).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, Expense, Invoice, LineItem, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects empty or whitespace-only text.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Rejects zero and negative amounts.
pub fn validate_positive(field: &str, value: Money) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative amounts.
pub fn validate_non_negative(field: &str, value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required("Customer name", &customer.name)
}

pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required("Product name", &product.name)
}

/// Expense amount must be strictly positive.
pub fn validate_expense(expense: &Expense) -> ValidationResult<()> {
    validate_positive("Amount", expense.amount)
}

pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_required("Item description", &item.description)
}

/// Validates an invoice before it is saved.
///
/// ## Rules
/// - Customer name must not be blank
/// - At least one line item, each with a description
/// - Discount must not be negative
///
/// ## Example
/// ```rust
/// use billbook_core::money::Money;
/// use billbook_core::types::{Invoice, LineItem, TaxRate};
/// use billbook_core::validation::validate_invoice;
///
/// let mut invoice = Invoice { customer: "Acme".into(), ..Invoice::default() };
/// assert!(validate_invoice(&invoice).is_err()); // no items
///
/// invoice.items.push(LineItem::new("Design", 1.0, Money::from_minor(5_000), TaxRate::zero()));
/// assert!(validate_invoice(&invoice).is_ok());
/// ```
pub fn validate_invoice(invoice: &Invoice) -> ValidationResult<()> {
    validate_required("Customer name", &invoice.customer)?;

    if invoice.items.is_empty() {
        return Err(ValidationError::AtLeastOne {
            field: "line item".to_string(),
        });
    }
    for item in &invoice.items {
        validate_line_item(item)?;
    }

    validate_non_negative("Discount", invoice.discount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseCategory, TaxRate};
    use chrono::NaiveDate;

    fn valid_invoice() -> Invoice {
        Invoice {
            customer: "Acme".to_string(),
            items: vec![LineItem::new("Widget", 1.0, Money::from_minor(100), TaxRate::zero())],
            ..Invoice::default()
        }
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer(&Customer::new("Ravi")).is_ok());
        assert_eq!(
            validate_customer(&Customer::new("")),
            Err(ValidationError::required("Customer name"))
        );
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&Product::new("Pen", Money::zero(), TaxRate::zero())).is_ok());
        assert!(validate_product(&Product::default()).is_err());
    }

    #[test]
    fn test_validate_expense_amount() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(validate_expense(&Expense::new(date, ExpenseCategory::Rent, Money::from_minor(1))).is_ok());

        let zero = Expense::new(date, ExpenseCategory::Rent, Money::zero());
        assert!(matches!(
            validate_expense(&zero),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_invoice_rules() {
        assert!(validate_invoice(&valid_invoice()).is_ok());

        let mut no_customer = valid_invoice();
        no_customer.customer = "  ".to_string();
        assert!(matches!(
            validate_invoice(&no_customer),
            Err(ValidationError::Required { .. })
        ));

        let mut no_items = valid_invoice();
        no_items.items.clear();
        assert!(matches!(
            validate_invoice(&no_items),
            Err(ValidationError::AtLeastOne { .. })
        ));

        let mut blank_item = valid_invoice();
        blank_item.items.push(LineItem::default());
        assert_eq!(
            validate_invoice(&blank_item),
            Err(ValidationError::required("Item description"))
        );

        let mut negative_discount = valid_invoice();
        negative_discount.discount = Money::from_minor(-1);
        assert!(matches!(
            validate_invoice(&negative_discount),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }
}
