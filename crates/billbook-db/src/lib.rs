//! # billbook-db: Persistence Layer for BillBook
//!
//! This crate stores the BillBook snapshot and reads and writes backup files.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BillBook Data Flow                               │
//! │                                                                         │
//! │  CLI command (invoice new)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  billbook-core: save_invoice(&snapshot, ...) ──► new Snapshot           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   billbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (snapshot.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SnapshotRepo   │    │ 0001_kv_...  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   backup.rs: Snapshot ◄──► billbook-backup-YYYY-MM-DD.json      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite Database: kv_store['billbook_data_v1']                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The snapshot blob repository
//! - [`backup`] - JSON backup export and import
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/billbook.db")).await?;
//!
//! let snapshot = db.snapshots().load().await?;
//! // ... apply billbook-core operations ...
//! db.snapshots().save(&snapshot).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::{export_backup, import_backup};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{SnapshotRepository, SNAPSHOT_KEY};
