//! Forward geocoding of free-text place names through Nominatim (OpenStreetMap).

use crate::http::{send_json, UpstreamError};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Geocoder returned an unparsable coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// The first match for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

// Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl Geocoder {
    /// Requests go out as `<user_agent> (nominatim)`.
    pub fn new(client: Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: format!("{user_agent} (nominatim)"),
        }
    }

    /// Looks up `query` and returns the best match, or `None` when nothing
    /// matches.
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent);

        let places: Vec<NominatimPlace> = send_json(&url, request).await?;
        let Some(first) = places.into_iter().next() else {
            debug!("No geocoding match for '{}'", query);
            return Ok(None);
        };

        let lat = parse_coordinate(&first.lat)?;
        let lon = parse_coordinate(&first.lon)?;
        let display_name = first
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| query.to_string());
        info!("Geocoded '{}' to {} ({}, {})", query, display_name, lat, lon);

        Ok(Some(GeocodedPlace {
            lat,
            lon,
            display_name,
        }))
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate(raw.to_string()))
}
