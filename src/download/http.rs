//! HTTP downloader backed by a blocking reqwest client

use super::tabular::{TabularRows, open_rows, read_rows};
use super::{Downloader, is_url};
use crate::error::{FaostatError, Result};
use encoding_rs::Encoding;
use reqwest::blocking::Client;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FaostatError::download("<client>", e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FaostatError::download(url, e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| FaostatError::download(url, e.to_string()))?;
        debug!(url = %url, bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");
        Ok(bytes.to_vec())
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch(url)
    }

    fn download_file(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        info!("Downloading {} to {}", url, dest.display());
        let body = self.fetch(url)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &body)?;
        Ok(dest.to_path_buf())
    }

    fn get_rows(
        &self,
        source: &str,
        encoding: &'static Encoding,
        header_rows: usize,
    ) -> Result<TabularRows> {
        if is_url(source) {
            let body = self.fetch(source)?;
            read_rows(Cursor::new(body), encoding, header_rows)
        } else {
            open_rows(Path::new(source), encoding, header_rows)
        }
    }
}
