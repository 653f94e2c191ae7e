//! Tests for indicator set collection

use super::*;
use crate::config::QuickchartsConfig;
use crate::download::{TabularRows, open_rows};
use crate::models::QuickchartIndicator;
use encoding_rs::Encoding;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

const FILELIST_URL: &str = "http://bulk.test/datasets_E.json";

const FILELIST: &str = r#"{
  "Datasets": {
    "Dataset": [
      {
        "DatasetCode": "FS",
        "DatasetName": "Food Security and Nutrition: Suite of Food Security Indicators",
        "DatasetDescription": "Food security indicators.",
        "FileLocation": "http://bulk.test/Food_Security_Data_E_All_Data_(Normalized).zip"
      },
      {
        "DatasetCode": "PP",
        "DatasetName": "Prices: Producer Prices",
        "DatasetDescription": "Producer prices.",
        "FileLocation": "http://bulk.test/Prices_E_All_Data_(Normalized).zip"
      },
      {
        "DatasetCode": "PA",
        "DatasetName": "Prices: Producer Prices (old series) archive",
        "DatasetDescription": "Old prices.",
        "FileLocation": "http://bulk.test/PricesArchive_E_All_Data_(Normalized).zip"
      },
      {
        "DatasetCode": "QCL",
        "DatasetName": "Production: Crops and livestock products",
        "DatasetDescription": "Production.",
        "FileLocation": "http://bulk.test/Production_Crops_Livestock_E_All_Data_(Normalized).zip"
      }
    ]
  }
}"#;

struct FakeDownloader {
    bodies: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl FakeDownloader {
    fn new() -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(FILELIST_URL.to_string(), FILELIST.as_bytes().to_vec());
        bodies.insert(
            "http://bulk.test/Food_Security_Data_E_All_Data_(Normalized).zip".to_string(),
            zipped("Food_Security_Data_E_All_Data_(Normalized).csv", "Area Code,Year\n2,2001\n"),
        );
        bodies.insert(
            "http://bulk.test/Prices_E_All_Data_(Normalized).zip".to_string(),
            zipped("Prices_E_All_Data_(Normalized).csv", "Area Code,Year\n3,2002\n"),
        );
        Self {
            bodies,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn zip_requests(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|url| url.ends_with(".zip"))
            .count()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FaostatError::download(url, "404 Not Found"))
    }

    fn download_file(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        let body = self.download(url)?;
        fs::write(dest, body)?;
        Ok(dest.to_path_buf())
    }

    fn get_rows(
        &self,
        source: &str,
        encoding: &'static Encoding,
        header_rows: usize,
    ) -> Result<TabularRows> {
        open_rows(Path::new(source), encoding, header_rows)
    }
}

fn zipped(member: &str, content: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(member, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn categories() -> BTreeMap<String, CategoryConfig> {
    let mut categories = BTreeMap::new();
    categories.insert(
        "Food Security and Nutrition".to_string(),
        CategoryConfig {
            title: "Food Security and Nutrition Indicators".to_string(),
            filename: "faostat-food-security-indicators-for-".to_string(),
            quickcharts: Some(QuickchartsConfig {
                code: "FS".to_string(),
                indicators: vec![QuickchartIndicator {
                    code: "21010".to_string(),
                    title: None,
                    unit: None,
                }],
            }),
        },
    );
    categories.insert(
        "Prices".to_string(),
        CategoryConfig {
            title: "Food Prices".to_string(),
            filename: "faostat-prices-for-".to_string(),
            quickcharts: None,
        },
    );
    categories
}

#[test]
fn test_collect_selects_categories_and_unpacks() {
    let temp_dir = TempDir::new().unwrap();
    let downloader = FakeDownloader::new();
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));

    let sets = collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets.file_count(), 2);

    let food = sets.get("Food Security and Nutrition").unwrap();
    assert_eq!(food[0].code, "FS");
    assert_eq!(food[0].path, temp_dir.path().join("FS.csv"));
    assert_eq!(food[0].quickcharts.as_ref().unwrap()[0].code, "21010");
    assert_eq!(fs::read_to_string(&food[0].path).unwrap(), "Area Code,Year\n2,2001\n");

    let prices = sets.get("Prices").unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].code, "PP");
    assert!(prices[0].quickcharts.is_none());

    assert_eq!(fs::read_to_string(temp_dir.path().join("PP.txt")).unwrap(), "OK");
    assert!(sets.get("Production").is_none());
    assert_eq!(downloader.zip_requests(), 2);
}

#[test]
fn test_fresh_cache_is_reused() {
    let temp_dir = TempDir::new().unwrap();
    let downloader = FakeDownloader::new();
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));

    collector.collect(FILELIST_URL, &categories()).unwrap();
    collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(downloader.zip_requests(), 2);
}

#[test]
fn test_stale_or_failed_cache_is_refreshed() {
    let temp_dir = TempDir::new().unwrap();
    let downloader = FakeDownloader::new();
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));
    collector.collect(FILELIST_URL, &categories()).unwrap();

    fs::write(temp_dir.path().join("FS.txt"), "FAILED").unwrap();
    collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(downloader.zip_requests(), 3);

    let stale = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::ZERO);
    stale.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(downloader.zip_requests(), 5);
}

#[test]
fn test_missing_member_skips_only_that_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let mut downloader = FakeDownloader::new();
    downloader.bodies.insert(
        "http://bulk.test/Prices_E_All_Data_(Normalized).zip".to_string(),
        zipped("something_else.csv", "x\n"),
    );
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));

    let sets = collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(sets.failed(), ["PP"]);
    assert!(sets.get("Prices").is_none());
    assert_eq!(sets.get("Food Security and Nutrition").unwrap().len(), 1);
    assert!(!temp_dir.path().join("PP.txt").exists());
}

#[test]
fn test_failed_download_does_not_stop_other_categories() {
    let temp_dir = TempDir::new().unwrap();
    let mut downloader = FakeDownloader::new();
    downloader
        .bodies
        .remove("http://bulk.test/Food_Security_Data_E_All_Data_(Normalized).zip");
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));

    let sets = collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(sets.failed(), ["FS"]);
    assert!(sets.get("Food Security and Nutrition").is_none());

    let prices = sets.get("Prices").unwrap();
    assert_eq!(prices[0].code, "PP");
    assert_eq!(fs::read_to_string(&prices[0].path).unwrap(), "Area Code,Year\n3,2002\n");
    assert_eq!(fs::read_to_string(temp_dir.path().join("PP.txt")).unwrap(), "OK");
}

#[test]
fn test_unparseable_location_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let mut downloader = FakeDownloader::new();
    let filelist = FILELIST.replace(
        "http://bulk.test/Prices_E_All_Data_(Normalized).zip",
        "not a url",
    );
    downloader
        .bodies
        .insert(FILELIST_URL.to_string(), filelist.into_bytes());
    let collector = IndicatorSetCollector::new(&downloader, temp_dir.path(), Duration::from_secs(3600));

    let sets = collector.collect(FILELIST_URL, &categories()).unwrap();
    assert_eq!(sets.failed(), ["PP"]);
    assert_eq!(sets.file_count(), 1);
}

#[test]
fn test_archive_member_name() {
    assert_eq!(
        archive_member("https://bulks-faostat.fao.org/production/Prices_E_All_Data_(Normalized).zip").unwrap(),
        "Prices_E_All_Data_(Normalized).csv"
    );
    assert!(archive_member("not a url").is_err());
}
