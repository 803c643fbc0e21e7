//! Upstream Feed Client
//!
//! Performs single outbound GET requests against the station and weather
//! feeds under a cancellable [`RequestContext`], and wraps the decoded JSON
//! in a [`FeedResponse`] whose accessors degrade to empty values when the
//! document does not have the expected shape.

mod client;
mod context;
mod error;
mod response;

pub use client::{FeedClient, RemoteDocument};
pub use context::RequestContext;
pub use error::FetchError;
pub use response::{FeedResponse, LAST_UPDATED_KEY, STATIONS_KEY};
