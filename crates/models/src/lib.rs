//! Bike-share Domain Models
//!
//! Station snapshots, dock-level bike records and weather observations as
//! they travel between the upstream feeds, the database and API clients.

mod station;
mod weather;

pub use station::{BikeRecord, Geometry, StationFeature, StationSnapshot};
pub use weather::{Clouds, Condition, Coordinate, Main, Rain, Sys, WeatherSnapshot, Wind};

use serde::{Deserialize, Deserializer, Serialize};

/// Station history enriched with the weather at query time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationsResponse {
    /// Floor timestamp the history was loaded from
    pub at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stations: Vec<StationSnapshot>,
    #[serde(default)]
    pub weather: WeatherSnapshot,
}

/// Decode `null` as the type's zero value.
///
/// The upstream feeds send `null` for fields that are merely empty.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
