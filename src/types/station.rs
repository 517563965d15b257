//! Station candidates and the weather-service documents they are read from.
//!
//! The point-metadata and station-collection documents are GeoJSON. Only the
//! fields this crate needs are modelled, and all of them are optional so that a
//! sparse or partially malformed document still deserializes.

use serde::{Deserialize, Deserializer, Serialize};

/// A station eligible for nearest-station selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCandidate {
    /// Station identifier, e.g. `"KMWL"`.
    pub station_id: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl StationCandidate {
    pub fn new(station_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            station_id: station_id.into(),
            latitude,
            longitude,
        }
    }
}

/// Response of `/points/{lat},{lon}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointMetadata {
    #[serde(default)]
    pub properties: PointProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    /// URL of the forecast periods for this point's grid cell.
    pub forecast: Option<String>,
    /// URL of the observation stations serving this point.
    pub observation_stations: Option<String>,
}

/// Response of a point's observation-stations collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationCollection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationFeature {
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: StationFeatureProperties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationFeatureProperties {
    pub station_identifier: Option<String>,
}

/// GeoJSON point geometry; coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Vec<Option<f64>>,
}

// An explicit `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StationFeature {
    /// Converts the feature into a candidate, or `None` when the identifier or
    /// either coordinate is missing.
    pub fn to_candidate(&self) -> Option<StationCandidate> {
        let id = self
            .properties
            .station_identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let coords = &self.geometry.as_ref()?.coordinates;
        let longitude = (*coords.first()?)?;
        let latitude = (*coords.get(1)?)?;
        Some(StationCandidate::new(id, latitude, longitude))
    }
}

impl StationCollection {
    /// Usable candidates, in upstream order.
    pub fn candidates(&self) -> Vec<StationCandidate> {
        self.features
            .iter()
            .filter_map(StationFeature::to_candidate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_skips_incomplete_features() {
        let collection: StationCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "properties": {"stationIdentifier": "KMWL"},
                    "geometry": {"type": "Point", "coordinates": [-98.06, 32.78]}
                },
                {
                    "properties": {"stationIdentifier": "KNOG"},
                    "geometry": null
                },
                {
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [-97.0, 32.0]}
                },
                {
                    "properties": {"stationIdentifier": ""},
                    "geometry": {"type": "Point", "coordinates": [-97.0, 32.0]}
                },
                {
                    "properties": {"stationIdentifier": "KNULL"},
                    "geometry": {"type": "Point", "coordinates": [null, 32.0]}
                },
                {
                    "properties": {"stationIdentifier": "KSHORT"},
                    "geometry": {"type": "Point", "coordinates": [-97.0]}
                },
                {
                    "properties": {"stationIdentifier": "KNOCOORD"},
                    "geometry": {"type": "Point", "coordinates": null}
                },
                {
                    "properties": null,
                    "geometry": {"type": "Point", "coordinates": [-97.0, 32.0]}
                }
            ]
        }))
        .unwrap();

        assert_eq!(
            collection.candidates(),
            vec![StationCandidate::new("KMWL", 32.78, -98.06)]
        );
    }

    #[test]
    fn test_collection_null_features_is_empty() {
        let collection: StationCollection =
            serde_json::from_value(json!({"features": null})).unwrap();
        assert!(collection.candidates().is_empty());
    }

    #[test]
    fn test_point_metadata_tolerates_missing_properties() {
        let points: PointMetadata = serde_json::from_value(json!({})).unwrap();
        assert!(points.properties.forecast.is_none());
        assert!(points.properties.observation_stations.is_none());

        let points: PointMetadata = serde_json::from_value(json!({
            "properties": {
                "forecast": "https://api.weather.gov/gridpoints/FWD/50,70/forecast",
                "observationStations": "https://api.weather.gov/gridpoints/FWD/50,70/stations"
            }
        }))
        .unwrap();
        assert_eq!(
            points.properties.observation_stations.as_deref(),
            Some("https://api.weather.gov/gridpoints/FWD/50,70/stations")
        );
    }
}
