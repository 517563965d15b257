//! The latest-observation document of a station, kept as upstream delivers it
//! (degrees Celsius, km/h, meters). Conversion happens only when formatting.

use serde::{Deserialize, Serialize};

/// A quantitative value; `value` is null whenever the sensor reported nothing.
/// A null measurement object reads as an empty measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Option<RawMeasurement>")]
pub struct Measurement {
    pub value: Option<f64>,
    pub unit_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeasurement {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    unit_code: Option<String>,
}

impl From<Option<RawMeasurement>> for Measurement {
    fn from(raw: Option<RawMeasurement>) -> Self {
        raw.map(|raw| Measurement {
            value: raw.value,
            unit_code: raw.unit_code,
        })
        .unwrap_or_default()
    }
}

/// `properties` of `/stations/{id}/observations/latest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Observation {
    /// ISO 8601 observation time.
    pub timestamp: Option<String>,
    pub text_description: Option<String>,
    /// Degrees Celsius.
    pub temperature: Measurement,
    /// Degrees Celsius.
    pub heat_index: Measurement,
    /// Degrees Celsius.
    pub wind_chill: Measurement,
    /// Percent.
    pub relative_humidity: Measurement,
    /// Degrees true.
    pub wind_direction: Measurement,
    /// km/h.
    pub wind_speed: Measurement,
    /// km/h.
    pub wind_gust: Measurement,
    /// Meters.
    pub visibility: Measurement,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ObservationResponse {
    #[serde(default)]
    pub properties: Observation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_observation_parses_nulls_and_missing_fields() {
        let response: ObservationResponse = serde_json::from_value(json!({
            "properties": {
                "timestamp": "2025-06-01T18:53:00+00:00",
                "textDescription": "Mostly Cloudy",
                "temperature": {"unitCode": "wmoUnit:degC", "value": 28.3},
                "windSpeed": {"unitCode": "wmoUnit:km_h-1", "value": null},
                "windGust": null,
                "barometricPressure": {"unitCode": "wmoUnit:Pa", "value": 101320}
            }
        }))
        .unwrap();

        let obs = response.properties;
        assert_eq!(obs.text_description.as_deref(), Some("Mostly Cloudy"));
        assert_eq!(obs.temperature.value, Some(28.3));
        assert_eq!(obs.temperature.unit_code.as_deref(), Some("wmoUnit:degC"));
        assert_eq!(obs.wind_speed.value, None);
        assert_eq!(obs.wind_gust, Measurement::default());
        assert_eq!(obs.visibility, Measurement::default());
    }
}
