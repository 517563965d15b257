use crate::types::location::InvalidCoordinateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Data path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("Failed to read location file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write location file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode saved locations")]
    Encode(#[source] serde_json::Error),

    #[error("Location file '{0}' is unreadable; refusing to overwrite it")]
    Corrupt(PathBuf, #[source] serde_json::Error),

    #[error(transparent)]
    InvalidEntry(#[from] InvalidCoordinateError),
}
