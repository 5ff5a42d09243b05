//! Songplay ETL Library
//!
//! Loads a song catalog and user activity logs from JSON-lines files into a
//! SQLite star schema: a `songplays` fact table with `songs`, `artists`,
//! `users` and `time` dimensions.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod sqlite_persistence;
pub mod transform;
pub mod walker;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use error::{EtlError, Result};
pub use pipeline::{run, LoadOptions, PhaseStats, RunSummary};
pub use warehouse::{SqliteWarehouse, WarehouseWriter, WAREHOUSE_QUERIES};
