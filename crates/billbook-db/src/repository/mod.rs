//! # Repository Module
//!
//! Database repository implementations for BillBook.
//!
//! The whole data set is one snapshot, so there is one repository: it
//! reads and writes the snapshot blob. Record-level CRUD happens in memory
//! in `billbook_core::repository`.

pub mod snapshot;

pub use snapshot::{SnapshotRepository, SNAPSHOT_KEY};
