//! FAOSTAT Processor Library
//!
//! Reshapes FAOSTAT bulk-data extracts into per-country CSV files with
//! normalized date ranges and HXL tag rows, and describes the resulting
//! per-country datasets for a data catalog.
//!
//! This library provides tools for:
//! - Resolving year, year-range and month tokens into date spans
//! - Mapping FAOSTAT area codes to ISO3 codes and canonical country names
//! - Annotating rows and splitting a row stream into one file per country
//! - Downloading and caching the bulk extracts of configured categories
//! - Planning catalog dataset, resource and showcase records

pub mod annotator;
pub mod collector;
pub mod config;
pub mod constants;
pub mod country_index;
pub mod dataset;
pub mod date_range;
pub mod download;
pub mod error;
pub mod models;
pub mod writer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use annotator::{AnnotatorOptions, RowAnnotator};
pub use config::FaostatConfig;
pub use country_index::CountryIndex;
pub use error::{FaostatError, Result};
pub use models::{CountryRecord, DateSpan, SourceRow};
pub use writer::{GroupingWriter, TemplateNamer, WriterOptions};
