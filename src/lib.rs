//! # Podium - Olympics results database loader
//!
//! One-shot administrative tool that turns the Olympic athlete events CSV
//! into a normalized SQLite database.
//!
//! Podium provides:
//! - A normalized relational model (countries, games, athletes, events,
//!   participations) with full referential integrity
//! - Streaming CSV ingestion with one-time header resolution
//! - Idempotent resolve-or-insert loading, safe to re-run over the same file
//! - Batched commits with a progress indicator and a final run report

pub mod config;
pub mod importer;
pub mod record;
pub mod source;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use importer::{ImportOptions, ImportReport, Importer};
pub use record::{Medal, ParsedRow, Season};
pub use source::{ColumnMap, RowError, RowSource};
pub use storage::SqliteStore;

/// Result type alias for Podium operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Podium operations
///
/// These are the fatal/precondition failures that abort a run. Per-row
/// recoverable failures are [`source::RowError`] values, counted in the
/// run report instead of propagated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
