//! Station Service
//!
//! Orchestrates the feed client and the station repository: ingestion of
//! the station feed, and history queries enriched with current weather.

mod config;
mod service;

pub use config::FeedConfig;
pub use service::{IngestSummary, StationService};

use feed_client::FetchError;
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the orchestrators
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    /// Feed answered but had no timestamp or no stations
    #[error("Station feed returned no usable data")]
    InvalidFeed,

    #[error("Invalid feed URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
