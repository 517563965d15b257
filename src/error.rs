use crate::config::ConfigError;
use crate::geocode::GeocodeError;
use crate::http::UpstreamError;
use crate::stations::error::LocateStationError;
use crate::storage::error::StoreError;
use crate::types::location::{InvalidCoordinateError, ParseUnitsError};
use crate::weather_data::error::WeatherDataError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WxBotError {
    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    LocateStation(#[from] LocateStationError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    InvalidUnits(#[from] ParseUnitsError),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinateError),

    #[error("No place matches '{0}'")]
    PlaceNotFound(String),

    #[error("Location store task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl WxBotError {
    /// Status code of the upstream response that failed, if any.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        self.upstream()?.status()
    }

    fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            WxBotError::Upstream(e) => Some(e),
            WxBotError::WeatherData(WeatherDataError::Upstream(e)) => Some(e),
            WxBotError::LocateStation(LocateStationError::Upstream(e)) => Some(e),
            WxBotError::Geocode(GeocodeError::Upstream(e)) => Some(e),
            _ => None,
        }
    }
}
