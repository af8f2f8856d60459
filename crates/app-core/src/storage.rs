//! A provider-agnostic service for storing uploaded files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory: {0}")]
    CreateDirFailed(#[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    WriteFileFailed(#[source] std::io::Error),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Unknown storage error")]
    Unknown,
}

/// Stores a blob under `file_name` and returns the URL it is served from.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_file(&self, file_name: &str, data: Vec<u8>, content_type: &str) -> Result<String, StorageError>;
}

#[cfg(feature = "storage-local")]
pub mod local {
    use std::path::{Component, Path, PathBuf};

    use async_trait::async_trait;
    use tokio::fs;

    use super::*;

    /// Saves files to the local disk under `base_path`; they are expected to
    /// be served statically from `base_url`.
    #[derive(Clone)]
    pub struct LocalStorageService {
        base_path: PathBuf,
        base_url: String,
    }

    impl LocalStorageService {
        pub fn new(base_path: String, base_url: String) -> Self {
            Self { base_path: PathBuf::from(base_path), base_url: base_url.trim_end_matches('/').to_string() }
        }
    }

    #[async_trait]
    impl StorageService for LocalStorageService {
        async fn upload_file(&self, file_name: &str, data: Vec<u8>, _: &str) -> Result<String, StorageError> {
            // Keys must stay inside base_path.
            let relative = Path::new(file_name);
            if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
                return Err(StorageError::InvalidKey(file_name.to_string()));
            }

            let file_path = self.base_path.join(relative);

            if let Some(parent_dir) = file_path.parent() {
                fs::create_dir_all(parent_dir).await.map_err(StorageError::CreateDirFailed)?;
            }

            fs::write(&file_path, data).await.map_err(StorageError::WriteFileFailed)?;

            tracing::debug!(path = %file_path.display(), "Stored uploaded file");

            Ok(format!("{}/{}", self.base_url, file_name))
        }
    }
}
