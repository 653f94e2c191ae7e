//! Country index construction from the FAOSTAT country reference table
//!
//! The reference table lists every FAOSTAT area with its numeric code, ISO3
//! code and name. Regional aggregates carry either no ISO3 code or a purely
//! numeric pseudo code and are rejected here.

use super::names::CountryNameAuthority;
use super::{CountryIndex, CountryMapping};
use crate::constants::reference_fields;
use crate::download::Downloader;
use crate::error::Result;
use crate::models::{CountryRecord, SourceRow};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Statistics collected while building a country index
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub rows_read: usize,
    /// Rows without an ISO3 code or with a numeric aggregate code
    pub rows_rejected: usize,
    /// Mapped ISO3 codes the name authority did not recognise
    pub unknown_iso3: Vec<String>,
    /// Accepted-list entries dropped because their ISO3 was already taken
    pub duplicate_iso3: usize,
    pub build_duration: Duration,
}

impl CountryIndex {
    /// Build the index from reference table rows
    pub fn build<I>(rows: I, authority: &dyn CountryNameAuthority) -> (Self, BuildStats)
    where
        I: IntoIterator<Item = SourceRow>,
    {
        let start_time = Instant::now();
        let mut stats = BuildStats::default();
        let mut mapping: HashMap<String, CountryMapping> = HashMap::new();

        for row in rows {
            stats.rows_read += 1;

            let Some(iso3) = accepted_iso3(row.get(reference_fields::ISO3_CODE)) else {
                stats.rows_rejected += 1;
                continue;
            };
            let Some(code) = row
                .get(reference_fields::COUNTRY_CODE)
                .map(str::trim)
                .filter(|c| !c.is_empty())
            else {
                stats.rows_rejected += 1;
                continue;
            };
            let original_name = row
                .get(reference_fields::COUNTRY)
                .unwrap_or_default()
                .trim()
                .to_string();
            let canonical_name = authority.name_for_iso3(&iso3);

            // Later rows for the same source code replace earlier ones
            mapping.insert(
                code.to_string(),
                CountryMapping {
                    iso3,
                    original_name,
                    canonical_name,
                },
            );
        }

        let mut entries: Vec<(&String, &CountryMapping)> = mapping.iter().collect();
        entries.sort_by(|(code_a, a), (code_b, b)| {
            (&a.iso3, &a.original_name, code_a).cmp(&(&b.iso3, &b.original_name, code_b))
        });

        let mut seen_iso3 = HashSet::new();
        let mut countries = Vec::new();
        for (code, entry) in entries {
            let Some(canonical_name) = &entry.canonical_name else {
                debug!("No canonical name for ISO3 {}, skipping country", entry.iso3);
                stats.unknown_iso3.push(entry.iso3.clone());
                continue;
            };
            if !seen_iso3.insert(entry.iso3.clone()) {
                debug!(
                    "Source code {} duplicates ISO3 {} ({}), keeping first entry",
                    code, entry.iso3, entry.original_name
                );
                stats.duplicate_iso3 += 1;
                continue;
            }
            countries.push(CountryRecord {
                source_code: code.clone(),
                iso3: entry.iso3.clone(),
                canonical_name: canonical_name.clone(),
                original_name: entry.original_name.clone(),
            });
        }

        stats.build_duration = start_time.elapsed();
        info!(
            "Country index built: {} countries, {} mapped codes from {} rows ({} rejected)",
            countries.len(),
            mapping.len(),
            stats.rows_read,
            stats.rows_rejected
        );
        if !stats.unknown_iso3.is_empty() {
            warn!(
                "{} ISO3 codes have no canonical name: {}",
                stats.unknown_iso3.len(),
                stats.unknown_iso3.join(", ")
            );
        }

        (Self { mapping, countries }, stats)
    }

    /// Load the reference table through a downloader and build the index
    pub fn load(
        source: &str,
        downloader: &dyn Downloader,
        authority: &dyn CountryNameAuthority,
    ) -> Result<(Self, BuildStats)> {
        info!("Loading country reference table from {}", source);
        let table = downloader.get_rows(source, encoding_rs::UTF_8, 1)?;
        let rows = table.rows.collect::<Result<Vec<_>>>()?;
        Ok(Self::build(rows, authority))
    }
}

/// Trimmed ISO3 code, or None for empty and purely numeric values
fn accepted_iso3(value: Option<&str>) -> Option<String> {
    let iso3 = value?.trim();
    if iso3.is_empty() || iso3.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(iso3.to_string())
}
