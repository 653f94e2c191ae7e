//! Integration tests for splitting a bulk extract into per-country files
//!
//! These tests write a small Windows-1252 bulk extract and a country
//! reference table to a temporary directory and run them through the same
//! path the `split` command uses.

use faostat_processor::country_index::Iso3Names;
use faostat_processor::download::{HttpDownloader, encoding_for_label, open_rows};
use faostat_processor::models::GroupingPolicy;
use faostat_processor::writer::GroupOutcome;
use faostat_processor::{
    CountryIndex, FaostatConfig, GroupingWriter, RowAnnotator, TemplateNamer,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const REFERENCE_TABLE: &str = "\
Country Group Code,Country Group,Country Code,Country,M49 Code,ISO2 Code,ISO3 Code
5100,Africa,4,Algeria,012,DZ,DZA
5100,Africa,107,Côte d'Ivoire,384,CI,CIV
5300,Asia,2,Afghanistan,004,AF,AFG
5000,World,5000,World,001,,
5200,Americas,5200,Americas,019,,019
";

/// Bulk extract rows: AFG, AFG, unmapped World, CIV, AFG again
fn write_extract(path: &Path) {
    let mut bytes = b"Area Code,Area,Item Code,Item,Year Code,Year,Unit,Value\n".to_vec();
    bytes.extend_from_slice(b"2,Afghanistan,21010,Energy supply,19992001,1999-2001,%,89.0\n");
    bytes.extend_from_slice(b"2,Afghanistan,21010,Energy supply,20002002,2000-2002,%,90.0\n");
    bytes.extend_from_slice(b"5000,World,21010,Energy supply,20002002,2000-2002,%,120.0\n");
    // Windows-1252 0xF4 for the accented o
    bytes.extend_from_slice(b"107,C");
    bytes.push(0xF4);
    bytes.extend_from_slice(b"te d'Ivoire,21010,Energy supply,2005,2005,%,110.0\n");
    bytes.extend_from_slice(b"2,Afghanistan,21010,Energy supply,2010,2010,%,95.0\n");
    fs::write(path, bytes).unwrap();
}

fn load_index(dir: &Path) -> CountryIndex {
    let reference = dir.join("countries.csv");
    fs::write(&reference, REFERENCE_TABLE).unwrap();
    let downloader = HttpDownloader::new("faostat-processor-tests", Duration::from_secs(5)).unwrap();
    let (index, stats) =
        CountryIndex::load(reference.to_str().unwrap(), &downloader, &Iso3Names::new()).unwrap();
    assert_eq!(stats.rows_read, 5);
    index
}

#[test]
fn test_split_windows_1252_extract_by_country() {
    let temp_dir = TempDir::new().unwrap();
    let index = load_index(temp_dir.path());
    assert_eq!(index.country_count(), 3);
    assert!(index.lookup("5200").is_none());

    let input = temp_dir.path().join("Food_Security.csv");
    write_extract(&input);

    let config = FaostatConfig::default();
    let encoding = encoding_for_label(&config.encoding).unwrap();
    let table = open_rows(&input, encoding, config.header_rows).unwrap();

    let out_dir = temp_dir.path().join("out");
    let writer = GroupingWriter::new(
        RowAnnotator::new(&index, config.annotator_options()),
        config.writer_options(),
    );
    let report = writer
        .process(&table.headers, table.rows, &TemplateNamer::new(&out_dir, "FS"))
        .unwrap();

    assert_eq!(report.rows_read, 5);
    assert_eq!(report.rows_written, 4);
    assert_eq!(report.files_written(), 3);
    assert_eq!(report.unmapped_runs(), 1);
    assert!(report.outcomes.contains(&GroupOutcome::Unmapped {
        country_code: "5000".to_string(),
        rows: 1,
    }));

    let afg = fs::read_to_string(out_dir.join("FS_AFG.csv")).unwrap();
    let lines: Vec<&str> = afg.lines().collect();
    assert_eq!(
        lines[0],
        "Iso3,Area Code,Area,Item Code,Item,StartDate,EndDate,Year Code,Year,Unit,Value"
    );
    assert_eq!(
        lines[1],
        "#country+code,,#country+name,#indicator+code,#indicator+name,#date+start,#date+end,,#date+year,#indicator+type,#indicator+value+num"
    );
    assert_eq!(
        lines[2],
        "AFG,2,Afghanistan,21010,Energy supply,1999-01-01,2001-12-31,19992001,2001,%,89.0"
    );
    assert_eq!(lines.len(), 4);

    let civ = fs::read_to_string(out_dir.join("FS_CIV.csv")).unwrap();
    assert!(civ.contains("CIV,107,Côte d'Ivoire,21010"));

    // AFG reappears after CIV, so its last run gets its own file
    let afg_second = fs::read_to_string(out_dir.join("FS_AFG_2.csv")).unwrap();
    assert!(afg_second.contains("2010-01-01,2010-12-31"));

    assert_eq!(
        report.bounds().unwrap().to_string(),
        "1999-01-01..2010-12-31"
    );
}

#[test]
fn test_split_with_merged_runs_and_country_names() {
    let temp_dir = TempDir::new().unwrap();
    let index = load_index(temp_dir.path());
    let input = temp_dir.path().join("Food_Security.csv");
    write_extract(&input);

    let config = FaostatConfig::default()
        .with_grouping_policy(GroupingPolicy::MergeRuns)
        .with_country_name();
    let table = open_rows(&input, encoding_for_label(&config.encoding).unwrap(), 1).unwrap();

    let out_dir = temp_dir.path().join("out");
    let writer = GroupingWriter::new(
        RowAnnotator::new(&index, config.annotator_options()),
        config.writer_options(),
    );
    let report = writer
        .process(&table.headers, table.rows, &TemplateNamer::new(&out_dir, ""))
        .unwrap();

    assert_eq!(report.files_written(), 2);
    assert!(!out_dir.join("AFG_2.csv").exists());

    let afg = fs::read_to_string(out_dir.join("AFG.csv")).unwrap();
    let lines: Vec<&str> = afg.lines().collect();
    assert!(lines[0].starts_with("Iso3,CountryName,Area Code"));
    assert_eq!(lines.len(), 5);
    assert!(lines[4].starts_with("AFG,Afghanistan,2,"));

    let merged = report.written().find(|o| o.iso3 == "AFG").unwrap();
    assert_eq!(merged.rows_written, 3);
    assert_eq!(merged.bounds.start_year(), 1999);
    assert_eq!(merged.bounds.end_year(), 2010);
}
