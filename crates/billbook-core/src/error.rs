//! # Error Types
//!
//! Domain-specific error types for billbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billbook-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Write-boundary validation failures             │
//! │                                                                         │
//! │  billbook-db errors (separate crate)                                   │
//! │  └── DbError          - Storage and backup file failures               │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Terminal     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed write never mutates anything: operations take `&Snapshot`, so
//! returning an error simply means no replacement snapshot was produced.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record with the given id does not exist in its collection.
    ///
    /// ## When This Occurs
    /// - Updating or deleting a record that was already deleted
    /// - `mark_paid` on an unknown invoice id
    /// - Adjusting stock of an unknown product
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Backup JSON parsed but does not look like a BillBook snapshot.
    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    /// Backup content is not valid JSON.
    #[error("Failed to parse backup file: {0}")]
    BackupParse(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a record does not meet the write requirements.
/// The message is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Collection must contain at least one entry.
    #[error("at least one {field} is required")]
    AtLeastOne { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found("Invoice", "A1B2");
        assert_eq!(err.to_string(), "Invoice not found: A1B2");

        let err = CoreError::InvalidBackup("missing invoices".to_string());
        assert_eq!(err.to_string(), "Invalid backup file: missing invoices");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("Customer name");
        assert_eq!(err.to_string(), "Customer name is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");

        let err = ValidationError::AtLeastOne {
            field: "line item".to_string(),
        };
        assert_eq!(err.to_string(), "at least one line item is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
