//! Core data structures and types for FAOSTAT processing.
//!
//! Defines source rows, country records, date spans and the small
//! enums selecting output conventions used throughout the library.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One row of a tabular source keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    values: HashMap<String, String>,
}

impl SourceRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from parallel header and value slices
    pub fn from_record<H, V>(headers: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let values = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Move a value to a new column name, returning false if the source column was absent
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.values.remove(from) {
            Some(value) => {
                self.values.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in the given column order, empty string for missing columns
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c.as_ref()).unwrap_or_default().to_string())
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for SourceRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// An accepted country with its identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub source_code: String,
    pub iso3: String,
    pub canonical_name: String,
    pub original_name: String,
}

/// Resolved observation period of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpan {
    Dates { start: NaiveDate, end: NaiveDate },
    Years { start: i32, end: i32 },
}

impl DateSpan {
    pub fn start_year(&self) -> i32 {
        match self {
            DateSpan::Dates { start, .. } => start.year(),
            DateSpan::Years { start, .. } => *start,
        }
    }

    pub fn end_year(&self) -> i32 {
        match self {
            DateSpan::Dates { end, .. } => end.year(),
            DateSpan::Years { end, .. } => *end,
        }
    }

    /// First calendar day covered by the span
    pub fn start_date(&self) -> NaiveDate {
        match self {
            DateSpan::Dates { start, .. } => *start,
            DateSpan::Years { start, .. } => {
                NaiveDate::from_ymd_opt(*start, 1, 1).unwrap_or(NaiveDate::MIN)
            }
        }
    }

    /// Last calendar day covered by the span
    pub fn end_date(&self) -> NaiveDate {
        match self {
            DateSpan::Dates { end, .. } => *end,
            DateSpan::Years { end, .. } => {
                NaiveDate::from_ymd_opt(*end, 12, 31).unwrap_or(NaiveDate::MAX)
            }
        }
    }
}

/// Which derived date fields annotated rows carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    /// `StartDate` / `EndDate` as YYYY-MM-DD
    #[default]
    Dates,
    /// `StartYear` / `EndYear` as integers
    Years,
}

impl DateMode {
    /// Names of the (start, end) synthetic columns
    pub fn field_names(&self) -> (&'static str, &'static str) {
        use crate::constants::{END_DATE_FIELD, END_YEAR_FIELD, START_DATE_FIELD, START_YEAR_FIELD};
        match self {
            DateMode::Dates => (START_DATE_FIELD, END_DATE_FIELD),
            DateMode::Years => (START_YEAR_FIELD, END_YEAR_FIELD),
        }
    }
}

/// Serialization used when date bounds are attached to catalog metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFormat {
    /// `YYYY-MM-DD..YYYY-MM-DD`
    #[default]
    Iso,
    /// `MM/DD/YYYY-MM/DD/YYYY`
    UsSlashed,
}

/// How repeated, non-contiguous runs of one country are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPolicy {
    /// Every contiguous run produces its own file
    #[default]
    ContiguousRuns,
    /// A recurring country is appended to the file of its first run
    MergeRuns,
}

/// Indicator highlighted in catalog quick charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickchartIndicator {
    pub code: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A cached source extract belonging to an indicator category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorFile {
    pub code: String,
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    pub quickcharts: Option<Vec<QuickchartIndicator>>,
}

impl IndicatorFile {
    /// Sub-category part of a dataset name like "Prices: Consumer Price Indices"
    pub fn subcategory(&self) -> &str {
        match self.name.split_once(": ") {
            Some((_, rest)) => rest.split(": ").next().unwrap_or(rest),
            None => &self.name,
        }
    }
}
