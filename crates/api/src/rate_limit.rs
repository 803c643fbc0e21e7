//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Limits the ingestion trigger per peer IP using tower_governor. Each
//! trigger fans out to the upstream feed and a burst of database writes, so
//! it gets its own quota separate from the read routes.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed on peer IP.
/// StateInformationMiddleware is used when use_headers() is called to add X-RateLimit-* headers
pub type IngestGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Burst size (max requests that can be made immediately)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst_size: 3,
        }
    }
}

/// Rejected rate limit settings
#[derive(Debug, thiserror::Error)]
#[error("Invalid rate limit: per_second and burst_size must be non-zero")]
pub struct InvalidRateLimit;

/// Create a rate limiting governor config
///
/// Uses PeerIpKeyExtractor, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// Adds X-RateLimit-* headers to responses for quota visibility.
pub fn create_governor_config(
    config: &RateLimitConfig,
) -> Result<Arc<IngestGovernorConfig>, InvalidRateLimit> {
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or(InvalidRateLimit)
}
