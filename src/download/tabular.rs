//! Streaming CSV row reader with legacy encoding support
//!
//! FAOSTAT bulk extracts are encoded in Windows-1252. Records are read as raw
//! bytes and each field is decoded with the declared encoding, so the file is
//! never materialized as a whole and non-UTF-8 input is handled correctly.

use crate::error::{FaostatError, Result};
use crate::models::SourceRow;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Column headers plus a lazy row iterator
pub struct TabularRows {
    pub headers: Vec<String>,
    pub rows: Box<dyn Iterator<Item = Result<SourceRow>>>,
}

impl std::fmt::Debug for TabularRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularRows")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Resolve an encoding label such as "WINDOWS-1252" or "utf-8"
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| FaostatError::UnsupportedEncoding {
        label: label.to_string(),
    })
}

/// Open a local CSV file as tabular rows
pub fn open_rows(path: &Path, encoding: &'static Encoding, header_rows: usize) -> Result<TabularRows> {
    let file = File::open(path)?;
    read_rows(BufReader::new(file), encoding, header_rows)
}

/// Read tabular rows from any reader
///
/// The first of `header_rows` rows supplies the column names; any further
/// header rows are skipped.
pub fn read_rows<R>(reader: R, encoding: &'static Encoding, header_rows: usize) -> Result<TabularRows>
where
    R: Read + 'static,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = csv::ByteRecord::new();
    let mut headers = Vec::new();
    for i in 0..header_rows.max(1) {
        if !csv_reader.read_byte_record(&mut record)? {
            break;
        }
        if i == 0 {
            headers = decode_record(&record, encoding);
            if let Some(first) = headers.first_mut() {
                *first = first.trim_start_matches('\u{feff}').to_string();
            }
        }
    }

    let row_headers = headers.clone();
    let rows = csv_reader
        .into_byte_records()
        .map(move |record| -> Result<SourceRow> {
            let record = record?;
            let values = decode_record(&record, encoding);
            Ok(SourceRow::from_record(row_headers.as_slice(), values.as_slice()))
        });

    Ok(TabularRows {
        headers,
        rows: Box::new(rows),
    })
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Vec<String> {
    record
        .iter()
        .map(|field| {
            let (text, _) = encoding.decode_without_bom_handling(field);
            text.trim().to_string()
        })
        .collect()
}
