//! Feed Client Error Types

use thiserror::Error;

/// Errors that can occur while fetching a remote document
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be built or sent
    #[error("Error sending request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with something other than 200 OK
    #[error("Unexpected status code {status} from {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Body was not a JSON object
    #[error("Error decoding JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller cancelled the request context
    #[error("Request cancelled")]
    Cancelled,

    /// Request context deadline elapsed
    #[error("Request deadline exceeded after {0}ms")]
    DeadlineExceeded(u64),

    /// Worker task ended without reporting an outcome
    #[error("Fetch worker aborted")]
    WorkerAborted,
}

impl FetchError {
    /// Whether the error came from the caller's context rather than upstream
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchError::Cancelled | FetchError::DeadlineExceeded(_))
    }
}
