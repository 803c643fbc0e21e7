//! Ingestion and Query Orchestration

use crate::config::FeedConfig;
use crate::ServiceError;
use feed_client::{FeedClient, RequestContext};
use models::{StationSnapshot, StationsResponse};
use storage::StationRepository;
use tracing::{debug, error, info, warn};

/// Result of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Feed timestamp the stations were stored under
    pub last_updated: String,
    /// Stations stored as a new poll
    pub inserted: usize,
    /// Stations already stored for this timestamp
    pub skipped: usize,
}

/// Drives the feed client and the repository
#[derive(Debug, Clone)]
pub struct StationService {
    repository: StationRepository,
    client: FeedClient,
    feeds: FeedConfig,
}

impl StationService {
    pub fn new(repository: StationRepository, client: FeedClient, feeds: FeedConfig) -> Self {
        Self {
            repository,
            client,
            feeds,
        }
    }

    pub fn repository(&self) -> &StationRepository {
        &self.repository
    }

    /// Poll the station feed and store every station it reports.
    ///
    /// Stations are written one after another; the first failure stops the
    /// run and earlier stations stay stored.
    pub async fn ingest(&self, ctx: &RequestContext) -> Result<IngestSummary, ServiceError> {
        let result = self.ingest_feed(ctx).await;
        if result.is_err() {
            metrics::counter!("bikeshare_ingest_failures_total").increment(1);
        }
        result
    }

    async fn ingest_feed(&self, ctx: &RequestContext) -> Result<IngestSummary, ServiceError> {
        let response = self.client.fetch(ctx, &self.feeds.station_url).await?;

        let Some((last_updated, features)) = response.station_feed() else {
            warn!("Station feed at {} has no usable data", self.feeds.station_url);
            return Err(ServiceError::InvalidFeed);
        };
        let last_updated = last_updated.to_string();

        let mut summary = IngestSummary {
            last_updated: last_updated.clone(),
            ..Default::default()
        };

        for feature in features {
            let station = feature.into_snapshot();
            let outcome = self
                .repository
                .insert_station(&last_updated, &station)
                .await
                .map_err(|e| {
                    error!("Failed to store kiosk {}: {}", station.kiosk_id, e);
                    e
                })?;

            if outcome.station_inserted {
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }

        metrics::counter!("bikeshare_stations_ingested_total").increment(summary.inserted as u64);
        info!(
            "Ingested feed of {}: {} stored, {} already present",
            summary.last_updated, summary.inserted, summary.skipped
        );
        Ok(summary)
    }

    /// Station history since `floor` plus the current weather
    pub async fn list_stations(
        &self,
        ctx: &RequestContext,
        floor: &str,
    ) -> Result<StationsResponse, ServiceError> {
        let stations = self.repository.query_all(floor).await?;
        debug!("{} station rows since {}", stations.len(), floor);

        let endpoint = self.feeds.weather_endpoint()?;
        let response = self.client.fetch(ctx, &endpoint).await?;
        let weather = response.weather().unwrap_or_else(|| {
            warn!("Weather document did not decode, returning empty weather");
            Default::default()
        });

        Ok(StationsResponse {
            at: floor.to_string(),
            stations,
            weather,
        })
    }

    /// Latest state of one kiosk since `floor`
    pub async fn get_station(
        &self,
        kiosk_id: i64,
        floor: &str,
    ) -> Result<StationSnapshot, ServiceError> {
        Ok(self.repository.query_specific(kiosk_id, floor).await?)
    }
}
