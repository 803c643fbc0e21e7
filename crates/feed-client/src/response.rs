//! Feed Response Extraction
//!
//! Typed accessors over a fetched document. The upstream shape is not
//! guaranteed, so a mismatch is logged and reported as an empty value.

use crate::client::RemoteDocument;
use models::{StationFeature, WeatherSnapshot};
use serde_json::Value;
use tracing::warn;

/// Key holding the feed's last-update timestamp
pub const LAST_UPDATED_KEY: &str = "last_updated";
/// Key holding the feed's feature list
pub const STATIONS_KEY: &str = "features";

/// A fetched document, possibly absent
#[derive(Debug, Clone, Default)]
pub struct FeedResponse {
    data: Option<RemoteDocument>,
}

impl FeedResponse {
    pub fn new(data: RemoteDocument) -> Self {
        Self { data: Some(data) }
    }

    /// Response without a document
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is no document, or either the timestamp or the
    /// station list cannot be extracted from it.
    pub fn is_invalid(&self) -> bool {
        self.station_feed().is_none()
    }

    /// Timestamp and decoded station list together, or `None` when the feed
    /// is invalid. The station list is decoded once.
    pub fn station_feed(&self) -> Option<(&str, Vec<StationFeature>)> {
        self.data.as_ref()?;
        let last_updated = self.last_updated();
        if last_updated.is_empty() {
            return None;
        }
        let stations = self.stations();
        if stations.is_empty() {
            return None;
        }
        Some((last_updated, stations))
    }

    /// Feed timestamp, or `""` when missing or not a string
    pub fn last_updated(&self) -> &str {
        let Some(data) = &self.data else {
            return "";
        };
        match data.get(LAST_UPDATED_KEY).and_then(Value::as_str) {
            Some(at) => at,
            None => {
                warn!("Feed field {} missing or not a string", LAST_UPDATED_KEY);
                ""
            }
        }
    }

    /// Station features, or an empty list when the key is missing, not a
    /// list, or any element does not decode as a feature.
    pub fn stations(&self) -> Vec<StationFeature> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        let features = match data.get(STATIONS_KEY) {
            Some(Value::Array(features)) => features,
            _ => {
                warn!("Feed field {} missing or not a list", STATIONS_KEY);
                return Vec::new();
            }
        };

        features
            .iter()
            .cloned()
            .map(serde_json::from_value::<StationFeature>)
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| {
                warn!("Error decoding {}: {}", STATIONS_KEY, e);
                Vec::new()
            })
    }

    /// The whole document read as a weather observation
    pub fn weather(&self) -> Option<WeatherSnapshot> {
        let data = self.data.as_ref()?;
        match serde_json::from_value(Value::Object(data.clone())) {
            Ok(weather) => Some(weather),
            Err(e) => {
                warn!("Error decoding weather: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> FeedResponse {
        match value {
            Value::Object(map) => FeedResponse::new(map),
            other => panic!("fixture is not an object: {}", other),
        }
    }

    fn station_feed() -> Value {
        json!({
            "last_updated": "2024-05-14T06:48:19.588Z",
            "features": [{
                "geometry": {"type": "Point", "coordinates": [-75.16, 39.95]},
                "properties": {
                    "kioskId": 3005,
                    "name": "Welcome Park, NPS",
                    "coordinates": [-75.16, 39.95],
                    "bikes": [{"dockNumber": 1, "isElectric": true, "isAvailable": true, "battery": 87}]
                },
                "type": "Feature"
            }],
            "type": "FeatureCollection"
        })
    }

    #[test]
    fn test_valid_feed() {
        let feed = response(station_feed());

        assert!(!feed.is_invalid());
        assert_eq!(feed.last_updated(), "2024-05-14T06:48:19.588Z");

        let stations = feed.stations();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].properties.kiosk_id, 3005);

        let (last_updated, features) = feed.station_feed().unwrap();
        assert_eq!(last_updated, "2024-05-14T06:48:19.588Z");
        assert_eq!(features, stations);
        assert_eq!(stations[0].properties.bikes[0].battery, 87);
    }

    #[test]
    fn test_absent_document_is_invalid() {
        let feed = FeedResponse::empty();
        assert!(feed.is_invalid());
        assert_eq!(feed.last_updated(), "");
        assert!(feed.stations().is_empty());
        assert!(feed.weather().is_none());
    }

    #[test]
    fn test_missing_station_list() {
        let mut value = station_feed();
        value.as_object_mut().unwrap().remove(STATIONS_KEY);
        let feed = response(value);

        assert!(feed.stations().is_empty());
        assert!(feed.is_invalid());
    }

    #[test]
    fn test_wrong_timestamp_type() {
        let mut value = station_feed();
        value[LAST_UPDATED_KEY] = json!(1715669299);
        let feed = response(value);

        assert_eq!(feed.last_updated(), "");
        assert!(feed.is_invalid());
    }

    #[test]
    fn test_empty_station_list_is_invalid() {
        let feed = response(json!({"last_updated": "2024-05-14T06:48:19.588Z", "features": []}));
        assert!(feed.is_invalid());
    }

    #[test]
    fn test_null_kiosk_id_keeps_feed_valid() {
        let mut value = station_feed();
        value[STATIONS_KEY]
            .as_array_mut()
            .unwrap()
            .push(json!({"properties": {"kioskId": null, "name": "Pop-up"}}));
        let feed = response(value);

        assert!(!feed.is_invalid());
        let (_, stations) = feed.station_feed().unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].properties.kiosk_id, 0);
    }

    #[test]
    fn test_malformed_feature_empties_list() {
        let mut value = station_feed();
        value[STATIONS_KEY]
            .as_array_mut()
            .unwrap()
            .push(json!({"properties": {"kioskId": "not a number"}}));
        let feed = response(value);

        assert!(feed.stations().is_empty());
        assert!(feed.is_invalid());
    }

    #[test]
    fn test_weather_extraction() {
        let feed = response(json!({
            "name": "Philadelphia",
            "main": {"temp": 68.4, "humidity": 52},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]
        }));

        let weather = feed.weather().unwrap();
        assert_eq!(weather.name, "Philadelphia");
        assert_eq!(weather.main.humidity, 52);
    }

    #[test]
    fn test_weather_shape_mismatch() {
        let feed = response(json!({"name": 42}));
        assert!(feed.weather().is_none());
    }
}
