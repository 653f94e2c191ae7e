//! Observed date bounds of an extract

use crate::models::{DateRangeFormat, DateSpan};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Earliest start and latest end seen across a set of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    pub fn from_span(span: &DateSpan) -> Self {
        Self {
            start: span.start_date(),
            end: span.end_date(),
        }
    }

    /// Widen the bounds to cover a span
    pub fn include(&mut self, span: &DateSpan) {
        self.merge(&Self::from_span(span));
    }

    /// Widen the bounds to cover another set of bounds
    pub fn merge(&mut self, other: &DateBounds) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }

    pub fn start_year(&self) -> i32 {
        self.start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }

    pub fn format(&self, format: DateRangeFormat) -> String {
        match format {
            DateRangeFormat::Iso => format!(
                "{}..{}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
            DateRangeFormat::UsSlashed => format!(
                "{}-{}",
                self.start.format("%m/%d/%Y"),
                self.end.format("%m/%d/%Y")
            ),
        }
    }
}

impl fmt::Display for DateBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DateRangeFormat::Iso))
    }
}

/// Fold an optional bounds accumulator with a new span
pub fn widen(bounds: &mut Option<DateBounds>, span: &DateSpan) {
    match bounds {
        Some(b) => b.include(span),
        None => *bounds = Some(DateBounds::from_span(span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_tracks_min_and_max() {
        let mut bounds = None;
        widen(&mut bounds, &DateSpan::Years { start: 2005, end: 2005 });
        widen(&mut bounds, &DateSpan::Years { start: 1999, end: 2001 });
        widen(&mut bounds, &DateSpan::Years { start: 2010, end: 2012 });

        let bounds = bounds.unwrap();
        assert_eq!(bounds.start_year(), 1999);
        assert_eq!(bounds.end_year(), 2012);
    }

    #[test]
    fn test_both_serializations() {
        let bounds = DateBounds {
            start: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2001, 12, 31).unwrap(),
        };
        assert_eq!(bounds.format(DateRangeFormat::Iso), "1999-01-01..2001-12-31");
        assert_eq!(
            bounds.format(DateRangeFormat::UsSlashed),
            "01/01/1999-12/31/2001"
        );
        assert_eq!(bounds.to_string(), "1999-01-01..2001-12-31");
    }
}
