use crate::storage::error::StoreError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "wxbot";

/// `<platform data dir>/wxbot`, or `./data` where the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub async fn ensure_data_dir_exists(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(StoreError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating data directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| StoreError::DataDirCreation(path.to_path_buf(), e))?;
            Ok(())
        }
        Err(e) => Err(StoreError::DataDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_data_dir() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        ensure_data_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Existing directories are fine.
        ensure_data_dir_exists(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_file_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ensure_data_dir_exists(file.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotADirectory(_)));
    }

    #[test]
    fn test_default_data_dir_is_named() {
        assert!(default_data_dir().ends_with("wxbot") || default_data_dir().ends_with("data"));
    }
}
