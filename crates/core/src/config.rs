//! Application configuration.
//!
//! Every field has a default matching the production data provider, so hosts only
//! override what they need.

use std::time::Duration;

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sites_url: String,
    pub needs_url: String,
    /// Only sites whose `country` equals this are kept.
    pub region: String,
    pub proximity_radius_m: f64,
    pub location: LocationRequest,
    pub notification_channel: ChannelSpec,
    pub alert_title: String,
    pub first_load_message: String,
    pub fallback_region: MapRegion,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sites_url: "https://www.givefood.org.uk/api/2/foodbanks/".to_owned(),
            needs_url: "https://www.givefood.org.uk/api/2/needs/".to_owned(),
            region: "Scotland".to_owned(),
            proximity_radius_m: 500.0,
            location: LocationRequest::default(),
            notification_channel: ChannelSpec::default(),
            alert_title: "Nearby Food Bank".to_owned(),
            first_load_message: "Showing food banks near you".to_owned(),
            fallback_region: MapRegion::default(),
        }
    }
}

impl AppConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))
    }
}

/// Options passed to the platform location service.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocationRequest {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Minimum movement before a watch reports again. Ignored for one-shot reads.
    pub distance_filter_m: f64,
}

impl LocationRequest {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 15_000,
            maximum_age_ms: 10_000,
            distance_filter_m: 1.0,
        }
    }
}

/// Local notification channel, created once before the first alert.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: u8,
    pub vibrate: bool,
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self {
            id: "default-channel-id".to_owned(),
            name: "Default Channel".to_owned(),
            description: "Default notification channel".to_owned(),
            importance: 4,
            vibrate: true,
        }
    }
}

/// Visible map area, centre plus span in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for MapRegion {
    fn default() -> Self {
        Self {
            latitude: 37.78825,
            longitude: -122.4324,
            latitude_delta: 0.0922,
            longitude_delta: 0.0421,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.region, "Scotland");
        assert_eq!(config.proximity_radius_m, 500.0);
        assert_eq!(config.location.timeout(), Duration::from_secs(15));
        assert_eq!(config.location.maximum_age(), Duration::from_secs(10));
        assert_eq!(config.notification_channel.id, "default-channel-id");
    }

    #[test]
    fn test_partial_json_override() {
        let config = AppConfig::from_json(
            r#"{ "region": "Wales", "location": { "timeout_ms": 5000 } }"#,
        )
        .unwrap();

        assert_eq!(config.region, "Wales");
        assert_eq!(config.location.timeout_ms, 5000);
        assert!(config.location.high_accuracy);
        assert_eq!(config.sites_url, AppConfig::default().sites_url);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            AppConfig::from_json("{ not json"),
            Err(CoreError::Config(_))
        ));
    }
}
