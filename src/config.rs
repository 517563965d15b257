//! Runtime settings, read from the environment (and a `.env` file if present).

use crate::geocode::DEFAULT_NOMINATIM_BASE_URL;
use crate::utils::default_data_dir;
use crate::weather_data::fetcher::{DEFAULT_FORECAST_TTL, DEFAULT_OBSERVATION_TTL};
use crate::weather_data::nws_client::DEFAULT_NWS_BASE_URL;
use bon::Builder;
use chrono_tz::Tz;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "wxbot (no-contact-set)";
pub const DEFAULT_STATION_ID: &str = "KMWL";
pub const DEFAULT_LAT: f64 = 32.793195;
pub const DEFAULT_LON: f64 = -98.089052;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{name} is out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Settings shared by every command.
///
/// ```
/// use wxbot::Config;
///
/// let config = Config::builder().default_station("KDFW").build();
/// assert_eq!(config.default_station, "KDFW");
/// assert_eq!(config.default_lat, 32.793195);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Sent on every upstream request. Should carry contact details.
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
    /// Used for users without a saved home.
    #[builder(into, default = DEFAULT_STATION_ID.to_string())]
    pub default_station: String,
    #[builder(default = DEFAULT_LAT)]
    pub default_lat: f64,
    #[builder(default = DEFAULT_LON)]
    pub default_lon: f64,
    #[builder(default = Tz::UTC)]
    pub timezone: Tz,
    #[builder(default = default_data_dir())]
    pub data_dir: PathBuf,
    #[builder(default = DEFAULT_OBSERVATION_TTL)]
    pub observation_ttl: Duration,
    #[builder(default = DEFAULT_FORECAST_TTL)]
    pub forecast_ttl: Duration,
    #[builder(into, default = DEFAULT_NWS_BASE_URL.to_string())]
    pub nws_base_url: String,
    #[builder(into, default = DEFAULT_NOMINATIM_BASE_URL.to_string())]
    pub nominatim_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    /// Loads `.env` (when present) and then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_lat = parse_coordinate("LAT", var("LAT"), 90.0)?;
        let default_lon = parse_coordinate("LON", var("LON"), 180.0)?;
        let observation_ttl = parse_seconds("WXBOT_OBS_TTL_SECS", var("WXBOT_OBS_TTL_SECS"))?;
        let forecast_ttl =
            parse_seconds("WXBOT_FORECAST_TTL_SECS", var("WXBOT_FORECAST_TTL_SECS"))?;

        Ok(Config::builder()
            .maybe_user_agent(var("NWS_USER_AGENT"))
            .maybe_default_station(var("STATION_ID").map(|s| s.to_uppercase()))
            .maybe_default_lat(default_lat)
            .maybe_default_lon(default_lon)
            .maybe_timezone(var("TZ").map(|tz| parse_timezone(&tz)))
            .maybe_data_dir(var("WXBOT_DATA_DIR").map(PathBuf::from))
            .maybe_observation_ttl(observation_ttl)
            .maybe_forecast_ttl(forecast_ttl)
            .maybe_nws_base_url(var("WXBOT_NWS_BASE_URL"))
            .maybe_nominatim_base_url(var("WXBOT_NOMINATIM_BASE_URL"))
            .build())
    }
}

fn parse_coordinate(
    name: &'static str,
    raw: Option<String>,
    limit: f64,
) -> Result<Option<f64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = raw
        .parse::<f64>()
        .map_err(|source| ConfigError::InvalidNumber {
            name,
            value: raw.clone(),
            source,
        })?;
    if !value.is_finite() || value.abs() > limit {
        return Err(ConfigError::OutOfRange { name, value });
    }
    Ok(Some(value))
}

fn parse_seconds(name: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    raw.map(|raw| {
        raw.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|source| ConfigError::InvalidSeconds {
                name,
                value: raw.clone(),
                source,
            })
    })
    .transpose()
}

// Unknown zone names fall back to UTC.
fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|e| {
        warn!(
            "Could not load timezone '{}': {} (falling back to UTC)",
            name, e
        );
        Tz::UTC
    })
}
