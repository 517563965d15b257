//! Conversions from the SI-style values the weather service reports.

use crate::format::MISSING;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn c_to_f(celsius: Option<f64>) -> Option<f64> {
    celsius.map(|c| c * 9.0 / 5.0 + 32.0)
}

pub fn kmh_to_mph(kmh: Option<f64>) -> Option<f64> {
    kmh.map(|v| v * 0.621371)
}

pub fn meters_to_miles(meters: Option<f64>) -> Option<f64> {
    meters.map(|m| m / 1609.344)
}

/// 16-point compass name for a bearing in degrees.
pub fn deg_to_compass(degrees: Option<f64>) -> &'static str {
    match degrees.filter(|d| d.is_finite()) {
        Some(d) => {
            let index = (d / 22.5).round_ties_even().rem_euclid(16.0) as usize;
            COMPASS_POINTS[index % 16]
        }
        None => MISSING,
    }
}
