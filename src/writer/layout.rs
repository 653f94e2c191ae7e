//! Output column layout and HXL tag row
//!
//! Extract columns are the source columns (after renames) with synthetic
//! columns added: the ISO3 code first, and the start/end columns directly
//! before the first column whose name mentions "year".

use crate::annotator::AnnotatorOptions;
use crate::constants::{COUNTRY_NAME_FIELD, ISO3_FIELD};
use std::collections::BTreeMap;

/// Ordered output columns of an extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<String>,
}

impl ColumnLayout {
    pub fn new<S: AsRef<str>>(
        source_headers: &[S],
        options: &AnnotatorOptions,
        emit_country_name: bool,
    ) -> Self {
        let (start_field, end_field) = options.date_mode.field_names();
        let mut leading = vec![ISO3_FIELD.to_string()];
        if emit_country_name {
            leading.push(COUNTRY_NAME_FIELD.to_string());
        }
        let dated = [start_field.to_string(), end_field.to_string()];

        let mut columns: Vec<String> = source_headers
            .iter()
            .map(|h| {
                let h = h.as_ref().trim();
                options
                    .field_renames
                    .get(h)
                    .cloned()
                    .unwrap_or_else(|| h.to_string())
            })
            .filter(|h| !leading.contains(h) && !dated.contains(h))
            .collect();

        // Without a year column the dates follow the leading columns
        let insert_at = columns
            .iter()
            .position(|c| c.to_lowercase().contains("year"))
            .unwrap_or(0);
        let tail = columns.split_off(insert_at);
        leading.extend(columns);
        leading.extend(dated);
        leading.extend(tail);

        Self { columns: leading }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Tag for each column, empty for untagged columns
    pub fn tag_row(&self, tags: &BTreeMap<String, String>) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| tags.get(c).cloned().unwrap_or_default())
            .collect()
    }
}
