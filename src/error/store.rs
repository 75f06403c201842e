//! Key-value store errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing the persisted thread id / credential slots.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "E_STORE_IO",
            StoreError::Corrupt { .. } => "E_STORE_CORRUPT",
            StoreError::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }
}
