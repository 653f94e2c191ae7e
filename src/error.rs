//! Error handling for FAOSTAT processing operations.
//!
//! Provides error types with context for downloads, cache handling,
//! date resolution, archive extraction and CSV extract writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaostatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Unrecognised date token '{token}': {reason}")]
    DateParse { token: String, reason: String },

    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Archive member '{member}' not found in {path}")]
    MissingArchiveMember { path: PathBuf, member: String },

    #[error("Failed to write extract {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Unsupported encoding label: {label}")]
    UnsupportedEncoding { label: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl FaostatError {
    /// Create a download error with context
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FaostatError>;
