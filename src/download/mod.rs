//! Download capability used by the collector and the country index
//!
//! Everything that touches the FAOSTAT bulk data service goes through the
//! [`Downloader`] trait, so tests can substitute a local fake.

pub mod http;
pub mod tabular;

pub use http::HttpDownloader;
pub use tabular::{TabularRows, encoding_for_label, open_rows, read_rows};

use crate::error::Result;
use encoding_rs::Encoding;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Blocking access to remote files and tabular sources
pub trait Downloader {
    /// Fetch the body of a URL
    fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Save the body of a URL to `dest`, returning the written path
    fn download_file(&self, url: &str, dest: &Path) -> Result<PathBuf>;

    /// Read a CSV source (URL or local path) as headers plus rows
    fn get_rows(
        &self,
        source: &str,
        encoding: &'static Encoding,
        header_rows: usize,
    ) -> Result<TabularRows>;
}

/// Fetch a URL and deserialize its JSON body
pub fn download_json<T: DeserializeOwned>(downloader: &dyn Downloader, url: &str) -> Result<T> {
    let body = downloader.download(url)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Whether a source string names a remote resource
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
