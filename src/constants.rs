//! Application constants for the FAOSTAT processor
//!
//! Field names used by the FAOSTAT bulk files and country reference table,
//! the default HXL tag vocabulary, and cache/download defaults.

// =============================================================================
// Source Field Names
// =============================================================================

/// Country code column in FAOSTAT bulk extracts
pub const AREA_CODE_FIELD: &str = "Area Code";

/// Year column (may hold a single year or a "Y1-Y2" range)
pub const YEAR_FIELD: &str = "Year";

/// Month column present in monthly extracts
pub const MONTHS_FIELD: &str = "Months";

/// Month value that marks an annual observation in monthly extracts
pub const ANNUAL_VALUE: &str = "Annual value";

/// Country reference table columns
pub mod reference_fields {
    pub const COUNTRY_CODE: &str = "Country Code";
    pub const ISO3_CODE: &str = "ISO3 Code";
    pub const COUNTRY: &str = "Country";
}

// =============================================================================
// Synthetic Output Fields
// =============================================================================

pub const ISO3_FIELD: &str = "Iso3";
pub const COUNTRY_NAME_FIELD: &str = "CountryName";
pub const START_DATE_FIELD: &str = "StartDate";
pub const END_DATE_FIELD: &str = "EndDate";
pub const START_YEAR_FIELD: &str = "StartYear";
pub const END_YEAR_FIELD: &str = "EndYear";

/// Default HXL tags applied to extract columns
pub const DEFAULT_HXL_TAGS: &[(&str, &str)] = &[
    ("Iso3", "#country+code"),
    ("CountryName", "#country+name"),
    ("StartDate", "#date+start"),
    ("EndDate", "#date+end"),
    ("StartYear", "#date+year+start"),
    ("EndYear", "#date+year+end"),
    ("Year", "#date+year"),
    ("Area", "#country+name"),
    ("Item Code", "#indicator+code"),
    ("Item", "#indicator+name"),
    ("Unit", "#indicator+type"),
    ("Value", "#indicator+value+num"),
];

// =============================================================================
// Input Defaults
// =============================================================================

/// Legacy single-byte encoding used by FAOSTAT bulk extracts
pub const DEFAULT_SOURCE_ENCODING: &str = "windows-1252";

/// Number of header rows in FAOSTAT bulk extracts
pub const DEFAULT_HEADER_ROWS: usize = 1;

// =============================================================================
// Cache and Download Defaults
// =============================================================================

/// Content written to a status file once an extract has been unpacked
pub const CACHE_STATUS_OK: &str = "OK";

/// Cached extracts older than this are downloaded again
pub const DEFAULT_CACHE_MAX_AGE_HOURS: u64 = 24;

/// Directory name used under the platform cache directory
pub const CACHE_DIR_NAME: &str = "faostat-processor";

pub const DEFAULT_USER_AGENT: &str = concat!("faostat-processor/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_FILELIST_URL: &str =
    "https://bulks-faostat.fao.org/production/datasets_E.json";

pub const DEFAULT_COUNTRYGROUP_URL: &str =
    "https://bulks-faostat.fao.org/production/FAOSTAT_data_country_groups.csv";

pub const DEFAULT_SHOWCASE_BASE_URL: &str = "https://www.fao.org/faostat/en/#country/";

pub const SHOWCASE_IMAGE_URL: &str =
    "https://pbs.twimg.com/profile_images/1375385494167691269/Bc49-Yx8_400x400.jpg";

// =============================================================================
// Catalog Metadata
// =============================================================================

/// Tags attached to every generated dataset
pub const BASE_DATASET_TAGS: &[&str] = &["hxl", "indicators"];

pub const EXPECTED_UPDATE_FREQUENCY: &str = "Every year";
