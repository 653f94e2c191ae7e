//! Catalog metadata for per-country datasets
//!
//! For one (category, country) pair the planner extracts the country's rows
//! from every indicator file of the category and describes the resulting
//! dataset, its resources and its showcase as serializable records. A
//! catalog uploader consumes these records; nothing here talks to a catalog.

use crate::annotator::RowAnnotator;
use crate::config::{CategoryConfig, FaostatConfig};
use crate::constants::{BASE_DATASET_TAGS, EXPECTED_UPDATE_FREQUENCY, SHOWCASE_IMAGE_URL};
use crate::country_index::CountryIndex;
use crate::download::{Downloader, encoding_for_label};
use crate::error::{FaostatError, Result};
use crate::models::{CountryRecord, DateRangeFormat, IndicatorFile, QuickchartIndicator};
use crate::writer::{DateBounds, GroupingWriter, ResourceOutcome};
use encoding_rs::Encoding;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{error, info, warn};

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

const QUICKCHART_HASHTAG: &str = "#indicator+code";
const QUICKCHART_NUMERIC_HASHTAG: &str = "#indicator+value+num";
const QUICKCHART_CUTDOWN_HASHTAGS: &[&str] = &["#indicator+code", "#country+code", "#date+year"];

/// Quick chart instructions attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickchartsPlan {
    pub hashtag: String,
    pub values: Vec<String>,
    pub numeric_hashtag: String,
    pub cutdown: u8,
    pub cutdown_hashtags: Vec<String>,
}

impl QuickchartsPlan {
    fn for_indicators(indicators: &[QuickchartIndicator]) -> Self {
        Self {
            hashtag: QUICKCHART_HASHTAG.to_string(),
            values: indicators.iter().map(|i| i.code.clone()).collect(),
            numeric_hashtag: QUICKCHART_NUMERIC_HASHTAG.to_string(),
            cutdown: 2,
            cutdown_hashtags: QUICKCHART_CUTDOWN_HASHTAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePlan {
    pub name: String,
    pub description: String,
    pub filename: String,
    pub path: PathBuf,
    pub rows: usize,
    pub date_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quickcharts: Option<QuickchartsPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowcasePlan {
    pub name: String,
    pub title: String,
    pub notes: String,
    pub url: String,
    pub image_url: String,
    pub tags: Vec<String>,
}

/// Everything a catalog needs to publish one country's dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetPlan {
    pub name: String,
    pub title: String,
    pub notes: String,
    pub country_iso3: String,
    pub expected_update_frequency: String,
    pub subnational: bool,
    pub tags: Vec<String>,
    pub dataset_date: String,
    pub resources: Vec<ResourcePlan>,
    pub showcase: ShowcasePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quickcharts_indicators: Option<Vec<QuickchartIndicator>>,
}

impl DatasetPlan {
    /// Write the plan as pretty JSON to `<dir>/<name>.json`
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.name));
        fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }
}

pub struct DatasetPlanner<'a> {
    writer: GroupingWriter<'a>,
    downloader: &'a dyn Downloader,
    categories: &'a BTreeMap<String, CategoryConfig>,
    encoding: &'static Encoding,
    header_rows: usize,
    date_format: DateRangeFormat,
    filelist_url: &'a str,
    showcase_base_url: &'a str,
    output_dir: PathBuf,
}

impl<'a> DatasetPlanner<'a> {
    pub fn new(
        config: &'a FaostatConfig,
        index: &'a CountryIndex,
        downloader: &'a dyn Downloader,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let annotator = RowAnnotator::new(index, config.annotator_options());
        Ok(Self {
            writer: GroupingWriter::new(annotator, config.writer_options()),
            downloader,
            categories: &config.categories,
            encoding: encoding_for_label(&config.encoding)?,
            header_rows: config.header_rows,
            date_format: config.date_format,
            filelist_url: &config.filelist_url,
            showcase_base_url: &config.showcase_base_url,
            output_dir: output_dir.into(),
        })
    }

    /// Extract `country` from each file and describe the resulting dataset
    ///
    /// Returns `None` when no file held rows for the country; such a
    /// dataset must not be published.
    pub fn plan(
        &self,
        category_name: &str,
        files: &[IndicatorFile],
        country: &CountryRecord,
    ) -> Result<Option<DatasetPlan>> {
        let category = self.categories.get(category_name).ok_or_else(|| {
            FaostatError::configuration(format!("unknown category '{}'", category_name))
        })?;
        let country_name = &country.canonical_name;
        let title = format!("{} - {}", country_name, category.title);
        let slug = slugify(&format!("{}{}", category.filename, country_name.to_lowercase()));
        info!("Creating dataset: {}", title);

        let mut resources = Vec::new();
        let mut subcategories = Vec::new();
        let mut quickcharts_indicators = None;
        let mut bounds: Option<DateBounds> = None;

        for file in files {
            let subcategory = file.subcategory();
            match self.extract_resource(file, country) {
                Ok(ResourceOutcome::Written(output)) => {
                    let quickcharts = file.quickcharts.as_deref().map(|indicators| {
                        quickcharts_indicators = Some(indicators.to_vec());
                        QuickchartsPlan::for_indicators(indicators)
                    });
                    match bounds.as_mut() {
                        Some(b) => b.merge(&output.bounds),
                        None => bounds = Some(output.bounds),
                    }
                    resources.push(ResourcePlan {
                        name: format!("{} for {}", resource_name(subcategory), country_name),
                        description: format!("*{}:*\n{}", subcategory, file.description),
                        filename: resource_filename(subcategory, &country.iso3),
                        path: output.path,
                        rows: output.rows_written,
                        date_range: output.bounds.format(self.date_format),
                        quickcharts,
                    });
                    subcategories.push(subcategory.to_string());
                }
                Ok(ResourceOutcome::NoData) => {
                    warn!("{} for {} has no data!", subcategory, country_name);
                }
                Err(e) => {
                    error!("Failed to extract {} for {}: {}", subcategory, country_name, e);
                }
            }
        }

        let Some(bounds) = bounds else {
            warn!("{} has no data!", country_name);
            return Ok(None);
        };
        resources.sort_by_key(|r| r.quickcharts.is_some());

        let tags = dataset_tags(category_name);
        let showcase = ShowcasePlan {
            name: format!("{}-showcase", slug),
            title: title.clone(),
            notes: format!("{} Data Dashboard for {}", category_name, country_name),
            url: format!("{}{}", self.showcase_base_url, country.iso3),
            image_url: SHOWCASE_IMAGE_URL.to_string(),
            tags: tags.clone(),
        };

        Ok(Some(DatasetPlan {
            notes: self.notes(&category.title, country_name, &subcategories),
            name: slug,
            title,
            country_iso3: country.iso3.clone(),
            expected_update_frequency: EXPECTED_UPDATE_FREQUENCY.to_string(),
            subnational: false,
            tags,
            dataset_date: bounds.format(self.date_format),
            resources,
            showcase,
            quickcharts_indicators,
        }))
    }

    fn extract_resource(&self, file: &IndicatorFile, country: &CountryRecord) -> Result<ResourceOutcome> {
        let source = file.path.to_string_lossy();
        let table = self
            .downloader
            .get_rows(&source, self.encoding, self.header_rows)?;
        let path = self
            .output_dir
            .join(resource_filename(file.subcategory(), &country.iso3));
        self.writer
            .extract_country(&country.iso3, &table.headers, table.rows, &path)
    }

    fn notes(&self, category_title: &str, country_name: &str, subcategories: &[String]) -> String {
        let mut notes = format!(
            "{} for {}.\n\nContains data from the FAOSTAT [bulk data service]({})",
            category_title, country_name, self.filelist_url
        );
        if subcategories.len() == 1 {
            notes.push('.');
        } else {
            notes.push_str(&format!(
                " covering the following categories: {}",
                subcategories.join(", ")
            ));
        }
        notes
    }
}

fn resource_name(subcategory: &str) -> String {
    if subcategory.ends_with("Indicators") {
        subcategory.to_string()
    } else {
        format!("{} data", subcategory)
    }
}

fn resource_filename(subcategory: &str, iso3: &str) -> String {
    format!("{}_{}.csv", subcategory, iso3)
}

/// Base tags plus the lower-cased category split on " - " or " and "
pub fn dataset_tags(category_name: &str) -> Vec<String> {
    let mut tags: Vec<String> = BASE_DATASET_TAGS.iter().map(|t| t.to_string()).collect();
    let tag = category_name.to_lowercase();
    if tag.contains(" - ") {
        tags.extend(tag.split(" - ").map(str::to_string));
    } else if tag.contains(" and ") {
        tags.extend(tag.split(" and ").map(str::to_string));
    } else {
        tags.push(tag);
    }
    tags
}

/// Lower-case ASCII slug with runs of other characters collapsed to '-'
pub fn slugify(text: &str) -> String {
    let folded = deunicode::deunicode(text).to_lowercase();
    NON_SLUG
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country_index::Iso3Names;
    use crate::download::{TabularRows, open_rows};
    use crate::models::SourceRow;
    use tempfile::TempDir;

    struct LocalFiles;

    impl Downloader for LocalFiles {
        fn download(&self, url: &str) -> Result<Vec<u8>> {
            Err(FaostatError::download(url, "offline"))
        }

        fn download_file(&self, url: &str, _dest: &Path) -> Result<PathBuf> {
            Err(FaostatError::download(url, "offline"))
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

    fn index() -> CountryIndex {
        let rows = [("2", "AFG", "Afghanistan"), ("3", "ALB", "Albania")]
            .into_iter()
            .map(|(code, iso3, name)| {
                [("Country Code", code), ("ISO3 Code", iso3), ("Country", name)]
                    .into_iter()
                    .collect::<SourceRow>()
            });
        CountryIndex::build(rows, &Iso3Names::new()).0
    }

    fn config() -> FaostatConfig {
        FaostatConfig::default()
            .with_encoding("utf-8")
            .with_category(
                "Food Security and Nutrition",
                CategoryConfig {
                    title: "Food Security and Nutrition Indicators".to_string(),
                    filename: "faostat-food-security-indicators-for-".to_string(),
                    quickcharts: None,
                },
            )
    }

    fn indicator_file(dir: &Path, code: &str, name: &str, content: &str) -> IndicatorFile {
        let path = dir.join(format!("{}.csv", code));
        fs::write(&path, content).unwrap();
        IndicatorFile {
            code: code.to_string(),
            name: name.to_string(),
            description: format!("{} description", code),
            path,
            quickcharts: None,
        }
    }

    #[test]
    fn test_plan_for_country() {
        let temp_dir = TempDir::new().unwrap();
        let index = index();
        let config = config();
        let downloader = LocalFiles;
        let planner = DatasetPlanner::new(&config, &index, &downloader, temp_dir.path().join("out")).unwrap();

        let mut suite = indicator_file(
            temp_dir.path(),
            "FS",
            "Food Security and Nutrition: Suite of Food Security Indicators",
            "Area Code,Area,Item Code,Item,Year,Unit,Value\n2,Afghanistan,21010,Energy supply,1999-2001,%,89.0\n3,Albania,21010,Energy supply,2001,%,120\n",
        );
        suite.quickcharts = Some(vec![QuickchartIndicator {
            code: "21010".to_string(),
            title: None,
            unit: None,
        }]);
        let prices = indicator_file(
            temp_dir.path(),
            "CP",
            "Food Security and Nutrition: Consumer Prices",
            "Area Code,Area,Year,Value\n2,Afghanistan,2005,3.1\n",
        );
        let country = index.find_by_iso3("AFG").unwrap().clone();

        let plan = planner
            .plan("Food Security and Nutrition", &[suite, prices], &country)
            .unwrap()
            .unwrap();

        assert_eq!(plan.title, "Afghanistan - Food Security and Nutrition Indicators");
        assert_eq!(plan.name, "faostat-food-security-indicators-for-afghanistan");
        assert_eq!(
            plan.tags,
            vec!["hxl", "indicators", "food security", "nutrition"]
        );
        assert_eq!(plan.dataset_date, "1999-01-01..2005-12-31");
        assert_eq!(plan.resources.len(), 2);

        // quick chart resource goes last
        assert_eq!(plan.resources[0].name, "Consumer Prices data for Afghanistan");
        assert_eq!(plan.resources[0].filename, "Consumer Prices_AFG.csv");
        assert_eq!(plan.resources[1].name, "Suite of Food Security Indicators for Afghanistan");
        assert_eq!(
            plan.resources[1].description,
            "*Suite of Food Security Indicators:*\nFS description"
        );
        assert_eq!(plan.resources[1].rows, 1);
        assert_eq!(plan.resources[1].quickcharts.as_ref().unwrap().values, vec!["21010"]);
        assert!(plan.notes.ends_with(
            "covering the following categories: Suite of Food Security Indicators, Consumer Prices"
        ));
        assert_eq!(plan.showcase.name, "faostat-food-security-indicators-for-afghanistan-showcase");
        assert!(plan.showcase.url.ends_with("AFG"));

        let written = fs::read_to_string(&plan.resources[1].path).unwrap();
        assert!(written.contains("AFG,2,Afghanistan,21010,Energy supply,1999-01-01,2001-12-31,2001,%,89.0"));
    }

    #[test]
    fn test_country_without_rows_has_no_plan() {
        let temp_dir = TempDir::new().unwrap();
        let index = index();
        let config = config();
        let downloader = LocalFiles;
        let planner = DatasetPlanner::new(&config, &index, &downloader, temp_dir.path()).unwrap();

        let file = indicator_file(
            temp_dir.path(),
            "CP",
            "Food Security and Nutrition: Consumer Prices",
            "Area Code,Area,Year,Value\n3,Albania,2005,3.1\n",
        );
        let mut missing = file.clone();
        missing.path = temp_dir.path().join("missing.csv");
        let country = index.find_by_iso3("AFG").unwrap().clone();

        let plan = planner
            .plan("Food Security and Nutrition", &[file, missing], &country)
            .unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn test_single_resource_notes_and_json() {
        let temp_dir = TempDir::new().unwrap();
        let index = index();
        let config = config().with_date_format(DateRangeFormat::UsSlashed);
        let downloader = LocalFiles;
        let planner = DatasetPlanner::new(&config, &index, &downloader, temp_dir.path()).unwrap();

        let file = indicator_file(
            temp_dir.path(),
            "CP",
            "Food Security and Nutrition: Consumer Prices",
            "Area Code,Area,Year,Value\n3,Albania,2005,3.1\n",
        );
        let country = index.find_by_iso3("ALB").unwrap().clone();
        let plan = planner
            .plan("Food Security and Nutrition", &[file], &country)
            .unwrap()
            .unwrap();

        assert!(plan.notes.ends_with("(https://bulks-faostat.fao.org/production/datasets_E.json)."));
        assert_eq!(plan.dataset_date, "01/01/2005-12/31/2005");

        let path = plan.write_json(&temp_dir.path().join("metadata")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(value["country_iso3"], "ALB");
        assert_eq!(value["resources"][0]["rows"], 1);
    }

    #[test]
    fn test_unknown_category_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let index = index();
        let config = config();
        let downloader = LocalFiles;
        let planner = DatasetPlanner::new(&config, &index, &downloader, temp_dir.path()).unwrap();
        let country = index.find_by_iso3("ALB").unwrap().clone();

        assert!(matches!(
            planner.plan("Trade", &[], &country),
            Err(FaostatError::Configuration { .. })
        ));
    }

    #[test]
    fn test_slugify_and_tags() {
        assert_eq!(slugify("faostat-prices-for-côte d'ivoire"), "faostat-prices-for-cote-d-ivoire");
        assert_eq!(slugify("faostat-prices-for-türkiye"), "faostat-prices-for-turkiye");
        assert_eq!(slugify("Åland Ærø Łódź"), "aland-aero-lodz");
        assert_eq!(dataset_tags("Prices"), vec!["hxl", "indicators", "prices"]);
        assert_eq!(
            dataset_tags("Emissions - Agriculture"),
            vec!["hxl", "indicators", "emissions", "agriculture"]
        );
    }
}
