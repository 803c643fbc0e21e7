//! Weather Observation Types
//!
//! Shape of a current-weather document. Every field defaults so a partial
//! document still decodes.

use crate::nullable;
use serde::{Deserialize, Serialize};

/// Current weather for the configured city
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub id: i64,
    pub dt: i64,
    pub timezone: i32,
    pub visibility: i32,
    #[serde(deserialize_with = "nullable")]
    pub base: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub cod: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain: Option<Rain>,
    pub clouds: Clouds,
    #[serde(rename = "coord")]
    pub coordinate: Coordinate,
    pub sys: Sys,
    pub main: Main,
    pub wind: Wind,
    #[serde(deserialize_with = "nullable")]
    pub weather: Vec<Condition>,
}

/// Condition code with a human readable description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i32,
    #[serde(deserialize_with = "nullable")]
    pub main: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub icon: String,
}

/// Rain volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rain {
    /// Volume over the last hour (mm)
    #[serde(rename = "1h")]
    pub hour: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    /// Cloudiness in percent
    pub all: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sys {
    #[serde(rename = "type")]
    pub kind: i32,
    pub id: i64,
    #[serde(deserialize_with = "nullable")]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub deg: i32,
    pub speed: f32,
}

/// Temperature and pressure readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Main {
    pub pressure: i32,
    pub humidity: i32,
    pub sea_level: i32,
    pub grnd_level: i32,
    pub temp: f32,
    pub feels_like: f32,
    pub temp_min: f32,
    pub temp_max: f32,
}

/// City location reported by the weather feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinate {
    #[serde(rename = "lon", alias = "long")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_decode() {
        let weather: WeatherSnapshot = serde_json::from_str(
            r#"{
                "coord": {"lon": -75.1638, "lat": 39.9523},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                "base": "stations",
                "main": {"temp": 68.4, "feels_like": 67.3, "temp_min": 65.1, "temp_max": 71.2, "pressure": 1017, "humidity": 52},
                "visibility": 10000,
                "wind": {"speed": 6.91, "deg": 250},
                "rain": {"1h": 0.25},
                "clouds": {"all": 0},
                "dt": 1715669299,
                "sys": {"type": 2, "id": 2037436, "country": "US", "sunrise": 1715679345, "sunset": 1715730766},
                "timezone": -14400,
                "id": 4560349,
                "name": "Philadelphia",
                "cod": 200
            }"#,
        )
        .unwrap();

        assert_eq!(weather.name, "Philadelphia");
        assert_eq!(weather.cod, 200);
        assert_eq!(weather.coordinate.longitude, -75.1638);
        assert_eq!(weather.weather[0].main, "Clear");
        assert_eq!(weather.rain, Some(Rain { hour: 0.25 }));
        assert_eq!(weather.sys.country, "US");
    }

    #[test]
    fn test_partial_weather_uses_defaults() {
        let weather: WeatherSnapshot = serde_json::from_str(r#"{"name": "Philadelphia"}"#).unwrap();
        assert_eq!(weather.name, "Philadelphia");
        assert!(weather.weather.is_empty());
        assert!(weather.rain.is_none());
    }
}
