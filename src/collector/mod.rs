//! Indicator set collection from the FAOSTAT bulk data service
//!
//! The bulk service publishes a JSON list of datasets, each pointing at a
//! zipped CSV extract. Datasets are assigned to configured categories by the
//! `"<category>:"` prefix of their name, downloaded into a cache folder, and
//! unpacked. Archived datasets are ignored. A dataset that cannot be
//! fetched is logged and left out; the others are still collected.

pub mod cache;

#[cfg(test)]
pub mod tests;

pub use cache::CachedExtract;

use crate::config::CategoryConfig;
use crate::download::{Downloader, download_json};
use crate::error::{FaostatError, Result};
use crate::models::IndicatorFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(rename = "Datasets")]
    datasets: DatasetList,
}

#[derive(Debug, Deserialize)]
struct DatasetList {
    #[serde(rename = "Dataset", default)]
    dataset: Vec<DatasetEntry>,
}

/// One entry of the bulk service file list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatasetEntry {
    pub dataset_code: String,
    pub dataset_name: String,
    #[serde(default)]
    pub dataset_description: String,
    pub file_location: String,
}

/// Category name to its indicator files, in file list order
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndicatorSets {
    sets: BTreeMap<String, Vec<IndicatorFile>>,
    /// Codes of datasets that could not be fetched
    failed: Vec<String>,
}

impl IndicatorSets {
    /// Append `file` to the category's list, creating the list on first use
    pub fn append_or_create(&mut self, category: &str, file: IndicatorFile) {
        self.sets.entry(category.to_string()).or_default().push(file);
    }

    pub fn get(&self, category: &str) -> Option<&[IndicatorFile]> {
        self.sets.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IndicatorFile])> {
        self.sets.iter().map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    /// Number of categories with at least one file
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }
}

pub struct IndicatorSetCollector<'a> {
    downloader: &'a dyn Downloader,
    folder: PathBuf,
    max_age: Duration,
}

impl<'a> IndicatorSetCollector<'a> {
    pub fn new(downloader: &'a dyn Downloader, folder: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            downloader,
            folder: folder.into(),
            max_age,
        }
    }

    /// Download (or reuse) the extracts of every configured category
    pub fn collect(
        &self,
        filelist_url: &str,
        categories: &BTreeMap<String, CategoryConfig>,
    ) -> Result<IndicatorSets> {
        info!("Fetching dataset list from {}", filelist_url);
        let list: FileList = download_json(self.downloader, filelist_url)?;
        fs::create_dir_all(&self.folder)?;

        let mut sets = IndicatorSets::default();
        for entry in &list.datasets.dataset {
            for (name, category) in categories {
                if !belongs_to(entry, name) {
                    continue;
                }
                match self.collect_entry(entry) {
                    Ok(Some(path)) => {
                        sets.append_or_create(name, indicator_file(entry, path, category))
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(
                            "Skipping {} ({}) from {}: {}",
                            entry.dataset_code, entry.dataset_name, entry.file_location, e
                        );
                        sets.failed.push(entry.dataset_code.clone());
                    }
                }
            }
        }

        info!(
            "Collected {} extracts across {} categories, {} failed",
            sets.file_count(),
            sets.len(),
            sets.failed.len()
        );
        Ok(sets)
    }

    /// Cached extract path, or None for an archived extract
    fn collect_entry(&self, entry: &DatasetEntry) -> Result<Option<PathBuf>> {
        let member = archive_member(&entry.file_location)?;
        if member.contains("Archive") {
            debug!("Skipping archived extract {}", member);
            return Ok(None);
        }
        self.fetch_extract(entry, &member).map(Some)
    }

    fn fetch_extract(&self, entry: &DatasetEntry, member: &str) -> Result<PathBuf> {
        let cached = CachedExtract::new(&self.folder, &entry.dataset_code);
        if cached.is_fresh(self.max_age) {
            debug!("Using cached {}", cached.csv_path.display());
            return Ok(cached.csv_path);
        }

        cached.invalidate()?;
        self.downloader
            .download_file(&entry.file_location, &cached.zip_path)?;
        cached.unpack(member)?;
        cached.mark_ok()?;
        info!("Cached {} as {}", entry.dataset_name, cached.csv_path.display());
        Ok(cached.csv_path)
    }
}

fn belongs_to(entry: &DatasetEntry, category: &str) -> bool {
    entry.dataset_name.contains(&format!("{}:", category))
        && !entry.dataset_name.to_lowercase().contains("archive")
}

/// CSV member name inside the zip: the URL's file name with zip replaced by csv
fn archive_member(file_location: &str) -> Result<String> {
    let url = Url::parse(file_location)
        .map_err(|e| FaostatError::download(file_location, e.to_string()))?;
    let basename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FaostatError::download(file_location, "URL has no file name"))?;
    Ok(basename.replace("zip", "csv"))
}

fn indicator_file(entry: &DatasetEntry, path: PathBuf, category: &CategoryConfig) -> IndicatorFile {
    let quickcharts = category
        .quickcharts
        .as_ref()
        .filter(|qc| qc.code == entry.dataset_code)
        .map(|qc| qc.indicators.clone());
    IndicatorFile {
        code: entry.dataset_code.clone(),
        name: entry.dataset_name.clone(),
        description: entry.dataset_description.clone(),
        path,
        quickcharts,
    }
}
