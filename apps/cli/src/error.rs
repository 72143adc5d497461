//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in BillBook                               │
//! │                                                                         │
//! │  billbook invoice mark-paid <id>                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<String, ApiError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Validation Error? ─── CoreError::Validation ──── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: "error [NOT_FOUND]: Invoice not found: 7c1e..."               │
//! │  exit code: ApiError::exit_code()                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL errors, file paths of failed writes) go to the log;
//! the message shown to the user stays short.

use billbook_core::CoreError;
use billbook_db::DbError;
use serde::Serialize;

use crate::state::ConfigError;

/// Error returned from CLI commands.
///
/// ## Serialization
/// With `--json` this is what gets printed when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice not found: 7c1e..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripting
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Backup file could not be read, parsed or written
    BackupError,

    /// Destructive command run without `--yes`
    ConfirmationRequired,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::BackupError => "BACKUP_ERROR",
            ErrorCode::ConfirmationRequired => "CONFIRMATION_REQUIRED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Refusal to run a destructive command without `--yes`.
    pub fn confirmation_required(action: &str) -> Self {
        ApiError::new(
            ErrorCode::ConfirmationRequired,
            format!("Refusing to {} without --yes", action),
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self.code {
            ErrorCode::ValidationError | ErrorCode::ConfirmationRequired => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::BackupError => 4,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Core(e) => ApiError::from(e),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Io(e) => ApiError::new(ErrorCode::BackupError, format!("File error: {}", e)),
            DbError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::new(ErrorCode::BackupError, "Could not serialize data")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            e @ (CoreError::InvalidBackup(_) | CoreError::BackupParse(_)) => {
                ApiError::new(ErrorCode::BackupError, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::ValidationError;

    #[test]
    fn test_core_not_found() {
        let err = ApiError::from(CoreError::not_found("Invoice", "abc"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Invoice not found: abc");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_validation_message_is_kept() {
        let err = ApiError::from(CoreError::from(ValidationError::required("Customer name")));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("Customer name"));
    }

    #[test]
    fn test_backup_errors() {
        let err = ApiError::from(DbError::Core(CoreError::InvalidBackup("missing invoices".into())));
        assert_eq!(err.code, ErrorCode::BackupError);
        assert!(err.message.starts_with("Invalid backup file"));
    }

    #[test]
    fn test_query_failure_hides_details() {
        let err = ApiError::from(DbError::QueryFailed("no such table: kv_store".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("kv_store"));
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::confirmation_required("clear all data");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CONFIRMATION_REQUIRED");
        assert_eq!(json["message"], "Refusing to clear all data without --yes");
    }
}
