use crate::http::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocateStationError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("No usable observation station found near ({lat}, {lon})")]
    EmptyCandidates { lat: f64, lon: f64 },
}
