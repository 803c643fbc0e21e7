//! Third-party feed configuration

use crate::ServiceError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Upstream feed endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Station status feed (GeoJSON feature collection)
    pub station_url: String,
    /// Current weather endpoint
    pub weather_url: String,
    /// City passed to the weather endpoint
    pub city: String,
    /// Weather API key
    pub api_key: String,
    /// Unit system requested from the weather endpoint
    pub units: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            station_url: "https://kiosks.bicycletransit.workers.dev/phl".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            city: "Philadelphia".to_string(),
            api_key: String::new(),
            units: "imperial".to_string(),
        }
    }
}

impl FeedConfig {
    /// Weather URL with city, key and units as query parameters
    pub fn weather_endpoint(&self) -> Result<String, ServiceError> {
        let url = Url::parse_with_params(
            &self.weather_url,
            &[
                ("q", self.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ],
        )
        .map_err(|e| ServiceError::InvalidUrl {
            url: self.weather_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(url.into())
    }
}
