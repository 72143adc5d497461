//! # State Module
//!
//! Manages state for a single CLI invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │          ┌───────────────────────┐     ┌───────────────────────┐       │
//! │          │       DbState         │     │     ConfigState       │       │
//! │          │                       │     │                       │       │
//! │          │  Database (SQLite)    │     │  db_path              │       │
//! │          │  Snapshot (live)      │     │  backup_dir           │       │
//! │          │                       │     │  due_days, currency   │       │
//! │          └───────────────────────┘     └───────────────────────┘       │
//! │                                                                         │
//! │  • DbState: the only mutable snapshot; replaced through commit()       │
//! │  • ConfigState: read-only after startup                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{config_file_path, format_currency, ConfigError, ConfigState, CONFIG_FILE};
pub use db::DbState;
