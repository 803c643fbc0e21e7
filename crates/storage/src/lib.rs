//! Storage Layer
//!
//! Persists station snapshots across three tables (`stations`, `bikes`,
//! `coordinates`) and reassembles them on read.

mod repository;
mod schema;
mod timestamp;

pub use repository::{InsertOutcome, StationRepository, StorageConfig};
pub use timestamp::normalize_timestamp;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },
}
