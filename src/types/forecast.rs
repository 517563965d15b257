//! Forecast periods as returned by a point's forecast resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named forecast window such as "Tonight".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastPeriod {
    pub name: Option<String>,
    pub short_forecast: Option<String>,
    pub detailed_forecast: Option<String>,
    /// A bare number, or a `{ "value": .. }` object when the service is asked
    /// for quantitative values.
    pub temperature: Option<Value>,
    pub temperature_unit: Option<String>,
    /// Free text, e.g. `"SSW"`.
    pub wind_direction: Option<String>,
    /// Free text, e.g. `"5 to 10 mph"`.
    pub wind_speed: Option<String>,
}

impl ForecastPeriod {
    pub fn temperature_value(&self) -> Option<f64> {
        match self.temperature.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::Object(map) => map.get("value").and_then(Value::as_f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ForecastResponse {
    #[serde(default)]
    pub properties: ForecastProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}
