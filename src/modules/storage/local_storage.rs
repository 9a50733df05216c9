//! Local filesystem storage for paper PDFs
//!
//! Blobs live flat in a single upload directory and are addressed by a
//! key of the form `{uuid-v7}-{sanitized original name}`. The directory
//! is served over HTTP under the configured public path, so a blob's URL
//! is `{public_path}/{key}`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::shared::validation::sanitize_filename;

/// Filesystem-backed blob store
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    public_path: String,
    max_file_size: usize,
}

impl LocalStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir,
            public_path: config.public_path,
            max_file_size: config.max_file_size,
        }
    }

    /// Create the upload directory if it does not exist yet.
    ///
    /// Safe to call repeatedly; an existing directory is left untouched.
    pub async fn ensure_dir_exists(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                self.upload_dir.display(),
                e
            ))
        })?;

        debug!("Upload directory ready: {}", self.upload_dir.display());
        Ok(())
    }

    /// Generate a storage key that is unique within the upload directory.
    ///
    /// The UUID v7 prefix keeps keys distinct across identical filenames and
    /// concurrent uploads, and sorts keys by upload time.
    pub fn generate_key(&self, original_filename: &str) -> String {
        format!("{}-{}", Uuid::now_v7(), sanitize_filename(original_filename))
    }

    /// Write a blob under `key`. Never overwrites an existing blob.
    pub async fn upload(&self, key: &str, data: &[u8]) -> Result<String, AppError> {
        let path = self.path_for(key)?;

        self.ensure_dir_exists().await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create blob '{}': {}", key, e)))?;

        file.write_all(data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write blob '{}': {}", key, e)))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush blob '{}': {}", key, e)))?;

        debug!(
            "Stored blob '{}' ({} bytes) in {}",
            key,
            data.len(),
            self.upload_dir.display()
        );
        Ok(key.to_string())
    }

    /// Delete the blob stored under `key`
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;

        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete blob '{}': {}", key, e)))?;

        info!("Deleted blob '{}'", key);
        Ok(())
    }

    /// Public URL a stored blob is served under
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_path, key)
    }

    /// Absolute-or-relative filesystem path of a blob key.
    ///
    /// Keys must be a single, non-hidden path component.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && !key.contains("..");

        if !valid {
            return Err(AppError::Storage(format!("Invalid blob key '{}'", key)));
        }

        Ok(self.upload_dir.join(key))
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn public_path(&self) -> &str {
        &self.public_path
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }
}
