//! Configuration management and validation.
//!
//! Provides the run configuration: bulk-service URLs, the indicator
//! categories to publish, HXL tags, input decoding and extract layout
//! options. Loaded from YAML, with command-line flags applied on top.

use crate::annotator::AnnotatorOptions;
use crate::constants::{
    CACHE_DIR_NAME, DEFAULT_CACHE_MAX_AGE_HOURS, DEFAULT_COUNTRYGROUP_URL, DEFAULT_FILELIST_URL,
    DEFAULT_HEADER_ROWS, DEFAULT_HXL_TAGS, DEFAULT_SHOWCASE_BASE_URL, DEFAULT_SOURCE_ENCODING,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::download::encoding_for_label;
use crate::error::{FaostatError, Result};
use crate::models::{DateMode, DateRangeFormat, GroupingPolicy, QuickchartIndicator};
use crate::writer::WriterOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Quick chart settings for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickchartsConfig {
    /// Dataset code whose extract feeds the quick charts
    pub code: String,
    pub indicators: Vec<QuickchartIndicator>,
}

/// An indicator category published as one dataset per country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Display title, e.g. "Food Security and Nutrition Indicators"
    pub title: String,
    /// Prefix of the dataset slug, e.g. "faostat-food-security-indicators-for-"
    pub filename: String,
    #[serde(default)]
    pub quickcharts: Option<QuickchartsConfig>,
}

/// Main configuration for a FAOSTAT run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaostatConfig {
    /// JSON list of bulk downloads
    pub filelist_url: String,

    /// Country reference table (area code to ISO3)
    pub countrygroup_url: String,

    pub showcase_base_url: String,

    /// Category name (as it prefixes dataset names) to its settings
    pub categories: BTreeMap<String, CategoryConfig>,

    /// Column name to HXL tag
    pub hxltags: BTreeMap<String, String>,

    /// Encoding label of the bulk extracts
    pub encoding: String,

    pub header_rows: usize,

    pub date_mode: DateMode,

    /// Format of dataset date bounds in metadata records
    pub date_format: DateRangeFormat,

    pub grouping_policy: GroupingPolicy,

    pub emit_country_name: bool,

    /// Source column renames applied to every extract row
    pub field_renames: BTreeMap<String, String>,

    /// Cached extracts older than this are downloaded again
    pub cache_max_age_hours: u64,

    /// Download cache; platform cache directory when unset
    pub cache_dir: Option<PathBuf>,

    pub user_agent: String,

    pub timeout_secs: u64,
}

impl Default for FaostatConfig {
    fn default() -> Self {
        Self {
            filelist_url: DEFAULT_FILELIST_URL.to_string(),
            countrygroup_url: DEFAULT_COUNTRYGROUP_URL.to_string(),
            showcase_base_url: DEFAULT_SHOWCASE_BASE_URL.to_string(),
            categories: BTreeMap::new(),
            hxltags: DEFAULT_HXL_TAGS
                .iter()
                .map(|(column, tag)| (column.to_string(), tag.to_string()))
                .collect(),
            encoding: DEFAULT_SOURCE_ENCODING.to_string(),
            header_rows: DEFAULT_HEADER_ROWS,
            date_mode: DateMode::Dates,
            date_format: DateRangeFormat::Iso,
            grouping_policy: GroupingPolicy::ContiguousRuns,
            emit_country_name: false,
            field_renames: BTreeMap::new(),
            cache_max_age_hours: DEFAULT_CACHE_MAX_AGE_HOURS,
            cache_dir: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FaostatConfig {
    /// Load configuration from a YAML file; missing keys take defaults
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)
            .map_err(|e| FaostatError::configuration(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| FaostatError::configuration(e.to_string()))
    }

    pub fn with_category(mut self, name: impl Into<String>, category: CategoryConfig) -> Self {
        self.categories.insert(name.into(), category);
        self
    }

    pub fn with_date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    pub fn with_date_format(mut self, date_format: DateRangeFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_grouping_policy(mut self, policy: GroupingPolicy) -> Self {
        self.grouping_policy = policy;
        self
    }

    /// Add the canonical country name column to extracts
    pub fn with_country_name(mut self) -> Self {
        self.emit_country_name = true;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Check values that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        encoding_for_label(&self.encoding)?;

        if self.header_rows == 0 {
            return Err(FaostatError::configuration("header_rows must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(FaostatError::configuration("timeout_secs must be positive"));
        }
        for (name, category) in &self.categories {
            if category.title.trim().is_empty() {
                return Err(FaostatError::configuration(format!(
                    "category '{}' has an empty title",
                    name
                )));
            }
            if category.filename.trim().is_empty() {
                return Err(FaostatError::configuration(format!(
                    "category '{}' has an empty filename",
                    name
                )));
            }
        }
        for (from, to) in &self.field_renames {
            if to.trim().is_empty() {
                return Err(FaostatError::configuration(format!(
                    "rename of '{}' has an empty target",
                    from
                )));
            }
        }
        Ok(())
    }

    pub fn annotator_options(&self) -> AnnotatorOptions {
        AnnotatorOptions {
            date_mode: self.date_mode,
            field_renames: self.field_renames.clone(),
            ..Default::default()
        }
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            policy: self.grouping_policy,
            hxl_tags: self.hxltags.clone(),
            emit_country_name: self.emit_country_name,
        }
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_hours * 3600)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured cache directory, or the platform default
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir(),
        }
    }
}

/// Platform cache directory for downloaded extracts
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_DIR_NAME))
        .ok_or_else(|| FaostatError::configuration("could not determine cache directory"))
}
