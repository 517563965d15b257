use crate::http::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Point ({lat}, {lon}) has no forecast resource")]
    MissingForecastUrl { lat: f64, lon: f64 },
}
