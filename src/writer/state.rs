//! Grouping state machine
//!
//! The grouping state is an owned value threaded through [`GroupState::step`];
//! each step returns the next state and, on a country change, the finished
//! group that must be flushed.

use super::bounds::{DateBounds, widen};
use crate::models::DateSpan;

/// One classified source row
#[derive(Debug, Clone, PartialEq)]
pub struct RowEvent {
    pub country_code: String,
    /// None when the country code is not in the country index
    pub iso3: Option<String>,
    pub payload: RowPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowPayload {
    /// Laid-out output values and the row's resolved span
    Data { values: Vec<String>, span: DateSpan },
    /// Row counted for its run but not written
    Rejected,
}

/// Buffered rows of one contiguous country run
#[derive(Debug, Clone, PartialEq)]
pub struct CountryGroup {
    pub country_code: String,
    pub iso3: Option<String>,
    pub rows: Vec<Vec<String>>,
    pub bounds: Option<DateBounds>,
    /// All rows of the run, written or not
    pub rows_seen: usize,
}

impl CountryGroup {
    fn start(event: RowEvent) -> Self {
        let mut group = Self {
            country_code: event.country_code.clone(),
            iso3: event.iso3.clone(),
            rows: Vec::new(),
            bounds: None,
            rows_seen: 0,
        };
        group.absorb(event);
        group
    }

    fn absorb(&mut self, event: RowEvent) {
        self.rows_seen += 1;
        if self.iso3.is_none() {
            return;
        }
        if let RowPayload::Data { values, span } = event.payload {
            widen(&mut self.bounds, &span);
            self.rows.push(values);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GroupState {
    #[default]
    NoGroup,
    InGroup(CountryGroup),
}

impl GroupState {
    /// Feed one row; returns the next state and any group finished by a country change
    pub fn step(self, event: RowEvent) -> (GroupState, Option<CountryGroup>) {
        match self {
            GroupState::NoGroup => (GroupState::InGroup(CountryGroup::start(event)), None),
            GroupState::InGroup(mut group) if group.country_code == event.country_code => {
                group.absorb(event);
                (GroupState::InGroup(group), None)
            }
            GroupState::InGroup(group) => {
                (GroupState::InGroup(CountryGroup::start(event)), Some(group))
            }
        }
    }

    /// End of stream: the final group, if any
    pub fn finish(self) -> Option<CountryGroup> {
        match self {
            GroupState::NoGroup => None,
            GroupState::InGroup(group) => Some(group),
        }
    }

    pub fn current_code(&self) -> Option<&str> {
        match self {
            GroupState::NoGroup => None,
            GroupState::InGroup(group) => Some(&group.country_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(code: &str, iso3: Option<&str>, year: i32) -> RowEvent {
        RowEvent {
            country_code: code.to_string(),
            iso3: iso3.map(str::to_string),
            payload: RowPayload::Data {
                values: vec![code.to_string(), year.to_string()],
                span: DateSpan::Years {
                    start: year,
                    end: year,
                },
            },
        }
    }

    #[test]
    fn test_transitions() {
        let state = GroupState::NoGroup;
        let (state, done) = state.step(data("2", Some("AFG"), 2000));
        assert!(done.is_none());
        assert_eq!(state.current_code(), Some("2"));

        let (state, done) = state.step(data("2", Some("AFG"), 1990));
        assert!(done.is_none());

        let (state, done) = state.step(data("3", Some("ALB"), 2001));
        let finished = done.unwrap();
        assert_eq!(finished.country_code, "2");
        assert_eq!(finished.rows.len(), 2);
        let bounds = finished.bounds.unwrap();
        assert_eq!((bounds.start_year(), bounds.end_year()), (1990, 2000));

        let last = state.finish().unwrap();
        assert_eq!(last.country_code, "3");
        assert_eq!(last.rows.len(), 1);
    }

    #[test]
    fn test_unmapped_group_buffers_nothing() {
        let (state, _) = GroupState::NoGroup.step(data("5000", None, 2000));
        let (state, _) = state.step(data("5000", None, 2001));
        let group = state.finish().unwrap();
        assert!(group.rows.is_empty());
        assert!(group.bounds.is_none());
        assert_eq!(group.rows_seen, 2);
    }

    #[test]
    fn test_rejected_rows_counted_not_buffered() {
        let rejected = RowEvent {
            country_code: "2".to_string(),
            iso3: Some("AFG".to_string()),
            payload: RowPayload::Rejected,
        };
        let (state, _) = GroupState::NoGroup.step(rejected);
        let group = state.finish().unwrap();
        assert_eq!(group.rows_seen, 1);
        assert!(group.rows.is_empty());
        assert_eq!(GroupState::NoGroup.finish(), None);
    }
}
