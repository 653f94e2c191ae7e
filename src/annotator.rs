//! Row annotation for FAOSTAT extracts
//!
//! Each source row is matched against the country index, given its ISO3 code
//! and canonical country name, and has its year/month tokens resolved into
//! start and end fields. Rows that belong to another country, to an
//! unregistered area code, or that carry an unparseable date are skipped.

use crate::constants::{AREA_CODE_FIELD, COUNTRY_NAME_FIELD, ISO3_FIELD, MONTHS_FIELD, YEAR_FIELD};
use crate::country_index::CountryIndex;
use crate::date_range;
use crate::error::FaostatError;
use crate::models::{DateMode, DateSpan, SourceRow};
use std::collections::BTreeMap;

/// Field names and options used when annotating rows
#[derive(Debug, Clone)]
pub struct AnnotatorOptions {
    pub country_code_field: String,
    pub year_field: String,
    pub month_field: String,
    pub date_mode: DateMode,
    /// Source column renames applied to every annotated row
    pub field_renames: BTreeMap<String, String>,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            country_code_field: AREA_CODE_FIELD.to_string(),
            year_field: YEAR_FIELD.to_string(),
            month_field: MONTHS_FIELD.to_string(),
            date_mode: DateMode::Dates,
            field_renames: BTreeMap::new(),
        }
    }
}

/// Why a row was left out of the output
#[derive(Debug)]
pub enum SkipReason {
    /// Row has no country code column or an empty value
    MissingCountryCode,
    /// Country code not present in the index
    UnknownCountry(String),
    /// Row belongs to a country other than the target
    OtherCountry(String),
    /// Year or month token could not be resolved
    BadDate(FaostatError),
}

/// A row ready to be written, with its resolved span
#[derive(Debug, Clone)]
pub struct AnnotatedRow {
    pub row: SourceRow,
    pub country_code: String,
    pub iso3: String,
    pub span: DateSpan,
}

#[derive(Debug)]
pub enum Annotation {
    Annotated(AnnotatedRow),
    Skip(SkipReason),
}

/// Annotates rows against a shared country index
#[derive(Debug, Clone)]
pub struct RowAnnotator<'a> {
    index: &'a CountryIndex,
    target_iso3: Option<String>,
    options: AnnotatorOptions,
}

impl<'a> RowAnnotator<'a> {
    pub fn new(index: &'a CountryIndex, options: AnnotatorOptions) -> Self {
        Self {
            index,
            target_iso3: None,
            options,
        }
    }

    /// Restrict annotation to rows resolving to one ISO3 code
    pub fn with_target(mut self, iso3: impl Into<String>) -> Self {
        self.target_iso3 = Some(iso3.into());
        self
    }

    pub fn options(&self) -> &AnnotatorOptions {
        &self.options
    }

    pub fn index(&self) -> &CountryIndex {
        self.index
    }

    /// Country code of a raw row, trimmed
    pub fn country_code<'r>(&self, row: &'r SourceRow) -> Option<&'r str> {
        row.get(&self.options.country_code_field)
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Annotate a single row, taking ownership of it
    pub fn annotate(&self, mut row: SourceRow) -> Annotation {
        let Some(code) = self.country_code(&row).map(str::to_string) else {
            return Annotation::Skip(SkipReason::MissingCountryCode);
        };
        let Some(mapping) = self.index.lookup(&code) else {
            return Annotation::Skip(SkipReason::UnknownCountry(code));
        };
        if let Some(target) = &self.target_iso3 {
            if !mapping.iso3.eq_ignore_ascii_case(target) {
                return Annotation::Skip(SkipReason::OtherCountry(mapping.iso3.clone()));
            }
        }

        let year = row.get(&self.options.year_field).unwrap_or_default();
        let month = row.get(&self.options.month_field);
        let resolved = match date_range::resolve(year, month) {
            Ok(resolved) => resolved,
            Err(e) => return Annotation::Skip(SkipReason::BadDate(e)),
        };

        let mode = self.options.date_mode;
        let (start_field, end_field) = mode.field_names();
        let (start_value, end_value) = resolved.field_values(mode);

        row.set(ISO3_FIELD, mapping.iso3.clone());
        row.set(COUNTRY_NAME_FIELD, mapping.display_name());
        row.set(start_field, start_value);
        row.set(end_field, end_value);
        if let Some(year) = &resolved.canonical_year {
            row.set(self.options.year_field.clone(), year.clone());
        }
        for (from, to) in &self.options.field_renames {
            row.rename(from, to);
        }

        Annotation::Annotated(AnnotatedRow {
            row,
            country_code: code,
            iso3: mapping.iso3.clone(),
            span: resolved.span(mode),
        })
    }
}
