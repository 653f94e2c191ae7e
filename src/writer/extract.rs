//! Single-country extraction from a whole source file
//!
//! Used when generating one dataset per country: the full bulk extract is
//! scanned and only rows resolving to the target ISO3 code are kept, in
//! whatever order they appear.

use super::bounds::{DateBounds, widen};
use super::{ColumnLayout, GroupOutput, GroupingWriter, write_extract};
use crate::annotator::{Annotation, SkipReason};
use crate::error::Result;
use crate::models::SourceRow;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of extracting one country's rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOutcome {
    Written(GroupOutput),
    /// No row matched the target country; nothing was written
    NoData,
}

impl ResourceOutcome {
    pub fn output(&self) -> Option<&GroupOutput> {
        match self {
            ResourceOutcome::Written(output) => Some(output),
            ResourceOutcome::NoData => None,
        }
    }
}

impl GroupingWriter<'_> {
    /// Write every row of `target_iso3` to `path`
    pub fn extract_country<I, S>(
        &self,
        target_iso3: &str,
        headers: &[S],
        rows: I,
        path: &Path,
    ) -> Result<ResourceOutcome>
    where
        I: IntoIterator<Item = Result<SourceRow>>,
        S: AsRef<str>,
    {
        let annotator = self.annotator.clone().with_target(target_iso3);
        let layout = ColumnLayout::new(headers, annotator.options(), self.options.emit_country_name);

        let mut buffered: Vec<Vec<String>> = Vec::new();
        let mut bounds: Option<DateBounds> = None;
        let mut country_code = None;
        let mut rows_read = 0usize;
        let mut rows_rejected = 0usize;

        for row in rows {
            let row = row?;
            rows_read += 1;
            match annotator.annotate(row) {
                Annotation::Annotated(annotated) => {
                    widen(&mut bounds, &annotated.span);
                    buffered.push(annotated.row.project(layout.columns()));
                    country_code.get_or_insert(annotated.country_code);
                }
                Annotation::Skip(SkipReason::BadDate(e)) => {
                    warn!("Row {} for {} rejected: {}", rows_read, target_iso3, e);
                    rows_rejected += 1;
                }
                Annotation::Skip(reason) => {
                    debug!("Row {} skipped: {:?}", rows_read, reason);
                }
            }
        }

        let Some(bounds) = bounds else {
            debug!(
                "No rows for {} among {} read ({} rejected)",
                target_iso3, rows_read, rows_rejected
            );
            return Ok(ResourceOutcome::NoData);
        };

        write_extract(
            path,
            layout.columns(),
            &layout.tag_row(&self.options.hxl_tags),
            &buffered,
        )?;
        info!(
            "Extracted {} of {} rows for {} ({}) to {}",
            buffered.len(),
            rows_read,
            target_iso3,
            bounds,
            path.display()
        );

        Ok(ResourceOutcome::Written(GroupOutput {
            country_code: country_code.unwrap_or_default(),
            iso3: target_iso3.to_string(),
            path: path.to_path_buf(),
            rows_written: buffered.len(),
            bounds,
        }))
    }
}
