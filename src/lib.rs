mod cache;
pub mod commands;
mod config;
mod error;
pub mod format;
mod geocode;
mod http;
mod stations;
pub mod storage;
mod types;
mod utils;
mod weather_data;
mod wxbot;

pub use config::{Config, ConfigError};
pub use error::WxBotError;
pub use wxbot::*;

pub use cache::{forecast_key, observation_key, round_coord, TtlCache};
pub use geocode::{GeocodeError, GeocodedPlace, Geocoder};
pub use http::{build_client, UpstreamError};
pub use stations::distance::haversine_km;
pub use stations::locate_station::{nearest_station, StationLocator};
pub use weather_data::fetcher::{WeatherCache, WeatherFetcher, WeatherPayload};
pub use weather_data::nws_client::NwsClient;

pub use types::forecast::ForecastPeriod;
pub use types::location::*;
pub use types::observation::{Measurement, Observation};
pub use types::station::StationCandidate;

pub use stations::error::LocateStationError;
pub use storage::error::StoreError;
pub use weather_data::error::WeatherDataError;
