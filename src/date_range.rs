//! Date range resolution for FAOSTAT year and month tokens.
//!
//! FAOSTAT rows carry the observation period as a bare year ("2001"),
//! a hyphenated multi-year range ("1999-2001"), or, in monthly extracts,
//! a month name alongside the year. This module turns those tokens into
//! concrete calendar spans.

use crate::constants::ANNUAL_VALUE;
use crate::error::{FaostatError, Result};
use crate::models::{DateMode, DateSpan};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid year pattern"));

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\.?\s+(\d{4})$").expect("valid month-year pattern")
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Result of resolving a row's year/month tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Replacement for the row's year field when the token was a range
    pub canonical_year: Option<String>,
}

impl ResolvedDates {
    /// Span in the representation selected by `mode`
    pub fn span(&self, mode: DateMode) -> DateSpan {
        match mode {
            DateMode::Dates => DateSpan::Dates {
                start: self.start,
                end: self.end,
            },
            DateMode::Years => DateSpan::Years {
                start: self.start.year(),
                end: self.end.year(),
            },
        }
    }

    /// String values for the synthetic (start, end) columns
    pub fn field_values(&self, mode: DateMode) -> (String, String) {
        match mode {
            DateMode::Dates => (
                self.start.format("%Y-%m-%d").to_string(),
                self.end.format("%Y-%m-%d").to_string(),
            ),
            DateMode::Years => (self.start.year().to_string(), self.end.year().to_string()),
        }
    }
}

/// Resolve a year token and optional month token into a date span
///
/// A month other than "Annual value" selects that calendar month. A
/// hyphenated year token spans from the start of its first year to the
/// end of its second, and the second year becomes the canonical year.
pub fn resolve(year: &str, month: Option<&str>) -> Result<ResolvedDates> {
    if let Some(month) = month.map(str::trim).filter(|m| *m != ANNUAL_VALUE) {
        let (start, end) = parse_date_range(&format!("{} {}", month, year.trim()))?;
        return Ok(ResolvedDates {
            start,
            end,
            canonical_year: None,
        });
    }

    if year.contains('-') {
        let parts: Vec<&str> = year.split('-').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(date_error(year, "expected exactly two years in range"));
        }
        let (start, _) = parse_date_range(parts[0])?;
        let (_, end) = parse_date_range(parts[1])?;
        if start > end {
            return Err(date_error(year, "range ends before it starts"));
        }
        return Ok(ResolvedDates {
            start,
            end,
            canonical_year: Some(parts[1].to_string()),
        });
    }

    let (start, end) = parse_date_range(year)?;
    Ok(ResolvedDates {
        start,
        end,
        canonical_year: None,
    })
}

/// Parse a single period token ("2001" or "May 2001") into its first and last day
pub fn parse_date_range(token: &str) -> Result<(NaiveDate, NaiveDate)> {
    let token = token.trim();
    if token.is_empty() {
        return Err(date_error(token, "empty token"));
    }

    if YEAR_RE.is_match(token) {
        let year = parse_year(token)?;
        return year_bounds(year).ok_or_else(|| date_error(token, "year out of range"));
    }

    if let Some(caps) = MONTH_YEAR_RE.captures(token) {
        let month = month_number(&caps[1])
            .ok_or_else(|| date_error(token, format!("unknown month '{}'", &caps[1])))?;
        let year = parse_year(&caps[2])?;
        return month_bounds(year, month).ok_or_else(|| date_error(token, "month out of range"));
    }

    Err(date_error(token, "not a year or month-year token"))
}

/// Month number (1-12) for a full English month name or its three-letter abbreviation
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| *m == lower || (lower.len() == 3 && m.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

fn parse_year(token: &str) -> Result<i32> {
    token
        .parse::<i32>()
        .map_err(|e| date_error(token, e.to_string()))
}

fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

fn date_error(token: &str, reason: impl Into<String>) -> FaostatError {
    FaostatError::DateParse {
        token: token.to_string(),
        reason: reason.into(),
    }
}
