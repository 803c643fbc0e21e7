//! Remote Feed Fetcher
//!
//! Each call spawns one worker task for the outbound request and races its
//! outcome against the caller's context. The worker reports through a
//! oneshot channel, so exactly one outcome is delivered at most once; if the
//! caller has already returned, the send fails and the outcome is dropped.
//! Inside the worker the first error ends the request; nothing after it is
//! attempted or reported.

use crate::context::RequestContext;
use crate::error::FetchError;
use crate::response::FeedResponse;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Generic JSON object returned by a feed
pub type RemoteDocument = serde_json::Map<String, serde_json::Value>;

/// Default connect timeout for outbound requests
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the station and weather feeds
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
}

impl FeedClient {
    /// Create a client with default transport settings
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("bikeshare/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|source| FetchError::Transport {
                url: String::new(),
                source,
            })?;

        info!("Creating feed client");
        Ok(Self { http })
    }

    /// Fetch `url` once and decode the body as a JSON object.
    ///
    /// Returns [`FetchError::Cancelled`] or [`FetchError::DeadlineExceeded`]
    /// as soon as `ctx` is cancelled or expires, without waiting for the
    /// worker. No retry is attempted.
    pub async fn fetch(&self, ctx: &RequestContext, url: &str) -> Result<FeedResponse, FetchError> {
        let started = Instant::now();

        // The worker's token is cancelled when this call returns or is dropped,
        // which ends an abandoned request.
        let worker_token = ctx.token().child_token();
        let _abandon = worker_token.clone().drop_guard();

        let (tx, rx) = oneshot::channel();
        let http = self.http.clone();
        let target = url.to_string();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                outcome = fetch_document(&http, &target) => outcome,
                _ = worker_token.cancelled() => {
                    debug!("Fetch worker for {} abandoned", target);
                    return;
                }
            };
            if tx.send(outcome).is_err() {
                debug!("Fetch outcome for {} dropped, caller already returned", target);
            }
        });

        let result = tokio::select! {
            biased;
            _ = ctx.token().cancelled() => Err(FetchError::Cancelled),
            _ = ctx.deadline_elapsed() => {
                Err(FetchError::DeadlineExceeded(started.elapsed().as_millis() as u64))
            }
            outcome = rx => outcome.unwrap_or(Err(FetchError::WorkerAborted)),
        };

        metrics::histogram!("bikeshare_fetch_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match result {
            Ok(document) => {
                debug!("Fetched {} ({} keys) in {:?}", url, document.len(), started.elapsed());
                Ok(FeedResponse::new(document))
            }
            Err(e) => {
                metrics::counter!("bikeshare_fetch_errors_total").increment(1);
                warn!("Fetch of {} failed: {}", url, e);
                Err(e)
            }
        }
    }
}

/// Perform the request. The response body is released when `response`
/// goes out of scope, on every path.
async fn fetch_document(http: &Client, url: &str) -> Result<RemoteDocument, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let request = http.get(url).build().map_err(transport)?;
    let response = http.execute(request).await.map_err(transport)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::UpstreamStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    Ok(serde_json::from_slice(&body)?)
}
