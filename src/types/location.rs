//! Coordinates, display units, and the per-user saved location record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographical coordinate: latitude first, longitude second, both in
/// decimal degrees.
///
/// ```
/// use wxbot::LatLon;
///
/// let mineral_wells = LatLon(32.793195, -98.089052);
/// assert_eq!(mineral_wells.0, 32.793195);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    /// Rejects non-finite parts, latitudes beyond ±90 and longitudes beyond
    /// ±180.
    ///
    /// ```
    /// use wxbot::LatLon;
    ///
    /// assert!(LatLon(32.79, -98.09).validate().is_ok());
    /// assert!(LatLon(f64::NAN, -98.09).validate().is_err());
    /// assert!(LatLon(32.79, 200.0).validate().is_err());
    /// ```
    pub fn validate(self) -> Result<Self, InvalidCoordinateError> {
        check_degrees("Latitude", self.0, 90.0)?;
        check_degrees("Longitude", self.1, 180.0)?;
        Ok(self)
    }
}

fn check_degrees(
    name: &'static str,
    value: f64,
    limit: f64,
) -> Result<(), InvalidCoordinateError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(InvalidCoordinateError { name, value, limit })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name} must be between -{limit} and {limit} degrees, got {value}.")]
pub struct InvalidCoordinateError {
    pub name: &'static str,
    pub value: f64,
    pub limit: f64,
}

/// Unit system used when displaying observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a units string is neither `imperial` nor `metric`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Units must be 'imperial' or 'metric'.")]
pub struct ParseUnitsError(pub String);

impl FromStr for Units {
    type Err = ParseUnitsError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            _ => Err(ParseUnitsError(s.to_string())),
        }
    }
}

/// A saved location as persisted for one `(user, name)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Uppercase station identifier.
    pub station_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub units: Units,
}

impl LocationEntry {
    pub fn new(station_id: &str, lat: f64, lon: f64, units: Units) -> Self {
        Self {
            station_id: station_id.trim().to_uppercase(),
            lat,
            lon,
            units,
        }
    }

    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }
}
