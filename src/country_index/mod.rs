//! Country index for FAOSTAT source codes
//!
//! FAOSTAT identifies areas by numeric "Area Code" values. This module maps
//! those codes to ISO3 codes and canonical country names, and keeps the
//! ordered list of countries for which per-country extracts are generated.
//! The index is built once per run and is read-only afterwards.

use crate::models::CountryRecord;
use std::collections::HashMap;

pub mod loader;
pub mod names;


pub use loader::BuildStats;
pub use names::{CountryNameAuthority, Iso3Names};

/// Raw lookup entry for one source country code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryMapping {
    pub iso3: String,
    pub original_name: String,
    /// Canonical name, absent when the ISO3 code is unknown to the name authority
    pub canonical_name: Option<String>,
}

impl CountryMapping {
    /// Canonical name, falling back to the source table's name
    pub fn display_name(&self) -> &str {
        self.canonical_name
            .as_deref()
            .unwrap_or(&self.original_name)
    }
}

/// Read-only country lookups built from the FAOSTAT country reference table
#[derive(Debug, Clone, Default)]
pub struct CountryIndex {
    /// Source code to ISO3 mapping, including countries missing from `countries`
    pub(crate) mapping: HashMap<String, CountryMapping>,

    /// Accepted countries sorted by (iso3, original name)
    pub(crate) countries: Vec<CountryRecord>,
}

impl CountryIndex {
    /// Look up a source country code
    pub fn lookup(&self, source_code: &str) -> Option<&CountryMapping> {
        self.mapping.get(source_code.trim())
    }

    /// Whether a source code resolves to an ISO3 code
    pub fn contains_code(&self, source_code: &str) -> bool {
        self.lookup(source_code).is_some()
    }

    /// Accepted countries in generation order
    pub fn countries(&self) -> &[CountryRecord] {
        &self.countries
    }

    /// Find an accepted country by ISO3 code
    pub fn find_by_iso3(&self, iso3: &str) -> Option<&CountryRecord> {
        self.countries
            .iter()
            .find(|c| c.iso3.eq_ignore_ascii_case(iso3))
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn mapping_count(&self) -> usize {
        self.mapping.len()
    }
}
