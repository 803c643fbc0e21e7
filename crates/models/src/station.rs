//! Station Snapshot Types

use crate::nullable;
use serde::{Deserialize, Serialize};

/// A single dock slot holding a bike at the time of a poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BikeRecord {
    /// Row id, only set when loaded from the database
    pub id: i64,
    #[serde(deserialize_with = "nullable")]
    pub kiosk_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub dock_number: i32,
    #[serde(deserialize_with = "nullable")]
    pub is_electric: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_available: bool,
    /// Battery level in percent (0 for classic bikes)
    #[serde(deserialize_with = "nullable")]
    pub battery: i32,
}

/// State of one kiosk as reported by one feed poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StationSnapshot {
    /// Poll timestamp (ISO-8601)
    #[serde(deserialize_with = "nullable")]
    pub at: String,
    #[serde(deserialize_with = "nullable")]
    pub kiosk_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub is_event_based: bool,
    #[serde(deserialize_with = "nullable")]
    pub is_virtual: bool,
    #[serde(deserialize_with = "nullable")]
    pub total_docks: i32,
    #[serde(deserialize_with = "nullable")]
    pub trikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub docks_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub bikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub classic_bikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub smart_bikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub electric_bikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub reward_bikes_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub reward_docks_available: i32,
    #[serde(deserialize_with = "nullable")]
    pub kiosk_type: i32,
    #[serde(deserialize_with = "nullable")]
    pub latitude: f64,
    #[serde(deserialize_with = "nullable")]
    pub longitude: f64,
    #[serde(alias = "kiokStatus", deserialize_with = "nullable")]
    pub kiosk_status: String,
    #[serde(deserialize_with = "nullable")]
    pub kiosk_public_status: String,
    #[serde(deserialize_with = "nullable")]
    pub kiosk_connection_status: String,
    #[serde(deserialize_with = "nullable")]
    pub address_street: String,
    #[serde(deserialize_with = "nullable")]
    pub address_city: String,
    #[serde(deserialize_with = "nullable")]
    pub address_state: String,
    #[serde(deserialize_with = "nullable")]
    pub address_zip_code: String,
    #[serde(deserialize_with = "nullable")]
    pub close_time: String,
    #[serde(deserialize_with = "nullable")]
    pub event_end: String,
    #[serde(deserialize_with = "nullable")]
    pub event_start: String,
    #[serde(deserialize_with = "nullable")]
    pub notes: String,
    #[serde(deserialize_with = "nullable")]
    pub open_time: String,
    #[serde(deserialize_with = "nullable")]
    pub public_text: String,
    #[serde(deserialize_with = "nullable")]
    pub time_zone: String,
    /// Flattened longitude/latitude pairs
    #[serde(deserialize_with = "nullable")]
    pub coordinates: Vec<f64>,
    #[serde(deserialize_with = "nullable")]
    pub bikes: Vec<BikeRecord>,
}

impl StationSnapshot {
    /// First longitude/latitude pair, if any
    pub fn coordinate_pair(&self) -> Option<(f64, f64)> {
        self.coordinate_pairs().next()
    }

    /// Iterate longitude/latitude pairs. A trailing odd value is ignored.
    pub fn coordinate_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.coordinates.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

/// GeoJSON point geometry of a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub coordinates: Vec<f64>,
}

/// One entry of the station feed's feature collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationFeature {
    pub geometry: Geometry,
    pub properties: StationSnapshot,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
}

impl StationFeature {
    /// Station properties, falling back to the feature geometry when the
    /// properties carry no coordinates of their own.
    pub fn into_snapshot(self) -> StationSnapshot {
        let mut station = self.properties;
        if station.coordinates.is_empty() && self.geometry.coordinates.len() >= 2 {
            station.coordinates = self.geometry.coordinates;
        }
        station
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_feed_feature_decode() {
        let feature: StationFeature = serde_json::from_str(
            r#"{
                "geometry": {"type": "Point", "coordinates": [-75.16374, 39.95378]},
                "properties": {
                    "kioskId": 3005,
                    "name": "Welcome Park, NPS",
                    "kiokStatus": "FullService",
                    "totalDocks": 13,
                    "notes": null,
                    "bikes": [{"dockNumber": 2, "isElectric": false, "isAvailable": true, "battery": null}]
                },
                "type": "Feature"
            }"#,
        )
        .unwrap();

        assert_eq!(feature.kind, "Feature");
        assert_eq!(feature.properties.kiosk_id, 3005);
        assert_eq!(feature.properties.kiosk_status, "FullService");
        assert_eq!(feature.properties.notes, "");
        assert_eq!(feature.properties.bikes[0].battery, 0);

        let station = feature.into_snapshot();
        assert_eq!(station.coordinate_pair(), Some((-75.16374, 39.95378)));
    }

    #[test]
    fn test_null_kiosk_id_decodes_as_zero() {
        let feature: StationFeature = serde_json::from_str(
            r#"{"properties": {"kioskId": null, "name": "Pop-up", "bikes": [{"kioskId": null}]}}"#,
        )
        .unwrap();

        assert_eq!(feature.properties.kiosk_id, 0);
        assert_eq!(feature.properties.name, "Pop-up");
        assert_eq!(feature.properties.bikes[0].kiosk_id, 0);
    }

    #[test]
    fn test_properties_coordinates_take_precedence() {
        let feature = StationFeature {
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: vec![1.0, 2.0],
            },
            properties: StationSnapshot {
                coordinates: vec![-75.16, 39.95],
                ..Default::default()
            },
            kind: "Feature".to_string(),
        };

        assert_eq!(feature.into_snapshot().coordinates, vec![-75.16, 39.95]);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let station = StationSnapshot {
            kiosk_id: 3005,
            address_zip_code: "19106".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&station).unwrap();
        assert_eq!(value["kioskId"], 3005);
        assert_eq!(value["addressZipCode"], "19106");
        assert_eq!(value["kioskStatus"], "");
    }

    proptest! {
        #[test]
        fn coordinate_pairs_follow_flat_layout(values in proptest::collection::vec(-180.0f64..180.0, 0..16)) {
            let station = StationSnapshot { coordinates: values.clone(), ..Default::default() };
            let pairs: Vec<_> = station.coordinate_pairs().collect();

            prop_assert_eq!(pairs.len(), values.len() / 2);
            for (i, (lon, lat)) in pairs.iter().enumerate() {
                prop_assert_eq!(*lon, values[2 * i]);
                prop_assert_eq!(*lat, values[2 * i + 1]);
            }
        }
    }
}
