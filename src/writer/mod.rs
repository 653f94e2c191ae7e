//! Per-country CSV extract writer
//!
//! Splits a FAOSTAT row stream into one CSV file per country. Rows are
//! annotated one at a time and buffered while the country code stays the
//! same; when it changes the buffered run is flushed to its own file with
//! an HXL tag row under the header. Only the current run is held in memory.
//!
//! # Grouping
//!
//! Grouping follows contiguous runs of the country code column. With
//! [`GroupingPolicy::ContiguousRuns`] every run is written to its own file,
//! so a stream ordered `A, A, B, B, A` yields two files for `A`. With
//! [`GroupingPolicy::MergeRuns`] a recurring country is appended to the file
//! written for its first run.
//!
//! Several area codes may resolve to one ISO3 code (FAOSTAT lists China
//! both as a whole and as its mainland). Run numbering and merging follow
//! the ISO3 code, so such runs never share a file name within a pass.
//!
//! Runs for area codes missing from the country index are dropped with a
//! warning and do not interrupt the surrounding stream.

pub mod bounds;
pub mod extract;
pub mod layout;
pub mod namer;
pub mod state;


pub use bounds::DateBounds;
pub use extract::ResourceOutcome;
pub use layout::ColumnLayout;
pub use namer::{GroupKey, OutputNamer, TemplateNamer};
pub use state::{CountryGroup, GroupState, RowEvent, RowPayload};

use crate::annotator::{Annotation, RowAnnotator, SkipReason};
use crate::error::{FaostatError, Result};
use crate::models::{GroupingPolicy, SourceRow};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options controlling extract output
#[derive(Debug, Clone, Default)]
pub struct WriterOptions {
    pub policy: GroupingPolicy,
    /// Column name to HXL tag
    pub hxl_tags: BTreeMap<String, String>,
    /// Add the canonical country name column after the ISO3 column
    pub emit_country_name: bool,
}

/// A written extract file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutput {
    pub country_code: String,
    pub iso3: String,
    pub path: PathBuf,
    pub rows_written: usize,
    pub bounds: DateBounds,
}

/// What happened to one contiguous run of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Written(GroupOutput),
    /// A mapped country run in which every row was rejected
    NoData { country_code: String, iso3: String },
    /// Run for an area code missing from the country index
    Unmapped { country_code: String, rows: usize },
}

/// Summary of one grouping pass
#[derive(Debug, Clone, Default)]
pub struct GroupingReport {
    pub outcomes: Vec<GroupOutcome>,
    pub rows_read: usize,
    pub rows_written: usize,
    /// Rows rejected for unparseable dates
    pub rows_rejected: usize,
    pub rows_missing_code: usize,
}

impl GroupingReport {
    /// Written extracts in stream order
    pub fn written(&self) -> impl Iterator<Item = &GroupOutput> {
        self.outcomes.iter().filter_map(|o| match o {
            GroupOutcome::Written(output) => Some(output),
            _ => None,
        })
    }

    pub fn files_written(&self) -> usize {
        self.written().count()
    }

    pub fn unmapped_runs(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, GroupOutcome::Unmapped { .. }))
            .count()
    }

    /// Overall bounds across all written extracts
    pub fn bounds(&self) -> Option<DateBounds> {
        self.written().fold(None, |acc, output| match acc {
            Some(mut b) => {
                DateBounds::merge(&mut b, &output.bounds);
                Some(b)
            }
            None => Some(output.bounds),
        })
    }
}

/// Groups an annotated row stream into per-country CSV extracts
#[derive(Debug, Clone)]
pub struct GroupingWriter<'a> {
    annotator: RowAnnotator<'a>,
    options: WriterOptions,
}

impl<'a> GroupingWriter<'a> {
    pub fn new(annotator: RowAnnotator<'a>, options: WriterOptions) -> Self {
        Self { annotator, options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Split a row stream into per-country files
    ///
    /// Read errors from the stream and write failures abort the pass.
    /// Unparseable dates and unregistered countries only skip rows.
    pub fn process<I, S>(
        &self,
        headers: &[S],
        rows: I,
        namer: &dyn OutputNamer,
    ) -> Result<GroupingReport>
    where
        I: IntoIterator<Item = Result<SourceRow>>,
        S: AsRef<str>,
    {
        let layout = ColumnLayout::new(headers, self.annotator.options(), self.options.emit_country_name);
        let mut sink = GroupSink {
            layout: &layout,
            options: &self.options,
            namer,
            report: GroupingReport::default(),
            runs_per_iso3: HashMap::new(),
            written_index: HashMap::new(),
            written_paths: HashSet::new(),
        };

        let mut state = GroupState::NoGroup;
        for row in rows {
            let row = row?;
            sink.report.rows_read += 1;

            let Some(event) = self.classify(row, &layout, &mut sink.report) else {
                continue;
            };
            let (next, finished) = state.step(event);
            state = next;
            if let Some(group) = finished {
                sink.flush(group)?;
            }
        }
        if let Some(group) = state.finish() {
            sink.flush(group)?;
        }

        let report = sink.report;
        info!(
            "Grouping complete: {} rows read, {} written to {} files, {} rejected, {} unmapped runs",
            report.rows_read,
            report.rows_written,
            report.files_written(),
            report.rows_rejected,
            report.unmapped_runs()
        );
        Ok(report)
    }

    /// Turn a raw row into a grouping event, or None if it carries no country code
    fn classify(
        &self,
        row: SourceRow,
        layout: &ColumnLayout,
        report: &mut GroupingReport,
    ) -> Option<RowEvent> {
        let code = self.annotator.country_code(&row).map(str::to_string);
        let iso3 = code
            .as_deref()
            .and_then(|c| self.annotator.index().lookup(c))
            .map(|m| m.iso3.clone());

        match self.annotator.annotate(row) {
            Annotation::Annotated(annotated) => Some(RowEvent {
                country_code: annotated.country_code,
                iso3: Some(annotated.iso3),
                payload: RowPayload::Data {
                    values: annotated.row.project(layout.columns()),
                    span: annotated.span,
                },
            }),
            Annotation::Skip(SkipReason::MissingCountryCode) => {
                debug!("Row {} has no country code, skipping", report.rows_read);
                report.rows_missing_code += 1;
                None
            }
            Annotation::Skip(SkipReason::UnknownCountry(country_code)) => Some(RowEvent {
                country_code,
                iso3: None,
                payload: RowPayload::Rejected,
            }),
            Annotation::Skip(SkipReason::BadDate(e)) => {
                warn!("Row {} rejected: {}", report.rows_read, e);
                report.rows_rejected += 1;
                Some(RowEvent {
                    country_code: code.unwrap_or_default(),
                    iso3,
                    payload: RowPayload::Rejected,
                })
            }
            Annotation::Skip(SkipReason::OtherCountry(other)) => {
                debug!("Row {} belongs to {}, skipping", report.rows_read, other);
                None
            }
        }
    }
}

/// Flush target for finished groups within one pass
struct GroupSink<'s> {
    layout: &'s ColumnLayout,
    options: &'s WriterOptions,
    namer: &'s dyn OutputNamer,
    report: GroupingReport,
    /// Mapped runs flushed so far for each ISO3 code
    runs_per_iso3: HashMap<String, usize>,
    /// Outcome index of the first written file per ISO3 code
    written_index: HashMap<String, usize>,
    /// Files created in this pass; a second write would truncate one
    written_paths: HashSet<PathBuf>,
}

impl GroupSink<'_> {
    fn flush(&mut self, group: CountryGroup) -> Result<()> {
        let Some(iso3) = group.iso3.clone() else {
            warn!(
                "Skipping {} rows for unregistered country code {}",
                group.rows_seen, group.country_code
            );
            self.report.outcomes.push(GroupOutcome::Unmapped {
                country_code: group.country_code,
                rows: group.rows_seen,
            });
            return Ok(());
        };

        let run_index = {
            let runs = self.runs_per_iso3.entry(iso3.clone()).or_insert(0);
            let index = *runs;
            *runs += 1;
            index
        };

        let Some(bounds) = group.bounds else {
            warn!(
                "No usable rows for {} (code {}), no extract written",
                iso3, group.country_code
            );
            self.report.outcomes.push(GroupOutcome::NoData {
                country_code: group.country_code,
                iso3,
            });
            return Ok(());
        };

        if self.options.policy == GroupingPolicy::MergeRuns {
            if let Some(&index) = self.written_index.get(&iso3) {
                if let GroupOutcome::Written(existing) = &mut self.report.outcomes[index] {
                    append_rows(&existing.path, &group.rows)?;
                    existing.rows_written += group.rows.len();
                    existing.bounds.merge(&bounds);
                    self.report.rows_written += group.rows.len();
                    debug!(
                        "Appended {} rows for {} to {}",
                        group.rows.len(),
                        iso3,
                        existing.path.display()
                    );
                    return Ok(());
                }
            }
        }

        let key = GroupKey {
            country_code: &group.country_code,
            iso3: &iso3,
            run_index,
        };
        let path = self.namer.path_for(&key);
        if !self.written_paths.insert(path.clone()) {
            return Err(FaostatError::WriteFailed {
                path,
                reason: format!(
                    "already written in this pass; run {} of {} (code {}) needs a distinct name",
                    run_index + 1,
                    iso3,
                    group.country_code
                ),
            });
        }
        write_extract(
            &path,
            self.layout.columns(),
            &self.layout.tag_row(&self.options.hxl_tags),
            &group.rows,
        )?;
        info!(
            "Wrote {} rows for {} ({}) to {}",
            group.rows.len(),
            iso3,
            bounds,
            path.display()
        );

        self.report.rows_written += group.rows.len();
        self.written_index
            .entry(iso3.clone())
            .or_insert(self.report.outcomes.len());
        self.report.outcomes.push(GroupOutcome::Written(GroupOutput {
            country_code: group.country_code,
            iso3,
            path,
            rows_written: group.rows.len(),
            bounds,
        }));
        Ok(())
    }
}

/// Write an extract: header row, tag row, then data rows
pub fn write_extract(
    path: &Path,
    columns: &[String],
    tags: &[String],
    rows: &[Vec<String>],
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let wrap = |e: csv::Error| write_failed(path, e);

    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    writer.write_record(columns).map_err(wrap)?;
    writer.write_record(tags).map_err(wrap)?;
    for row in rows {
        writer.write_record(row).map_err(wrap)?;
    }
    writer.flush()?;
    Ok(())
}

fn append_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| write_failed(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_failed(path: &Path, e: csv::Error) -> FaostatError {
    FaostatError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
