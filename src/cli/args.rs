//! Command-line argument definitions for the FAOSTAT processor
//!
//! Global flags select the configuration file and logging verbosity; each
//! subcommand adds its own overrides on top of the loaded configuration.

use crate::models::{DateMode, DateRangeFormat, GroupingPolicy};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the FAOSTAT extract processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "faostat-processor",
    version,
    about = "Reshape FAOSTAT bulk-data extracts into per-country HXL-tagged CSV files",
    long_about = "Downloads FAOSTAT bulk-data extracts, splits them into one CSV per country \
                  with ISO3 codes, normalized start/end dates and an HXL tag row, and writes \
                  catalog metadata describing one dataset per country and category."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress output except errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download configured categories and write every country's extracts and metadata
    Run(RunArgs),
    /// Split a local bulk extract into one CSV per country
    Split(SplitArgs),
    /// List the countries accepted from the reference table
    Countries(CountriesArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Output directory for extracts and metadata
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = "output")]
    pub output_path: PathBuf,

    /// Download cache directory (defaults to the platform cache directory)
    #[arg(long = "cache-path", value_name = "PATH")]
    pub cache_path: Option<PathBuf>,

    /// Only process these categories
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Only process these ISO3 codes
    #[arg(long = "country", value_name = "ISO3")]
    pub countries: Vec<String>,

    #[arg(long = "date-mode", value_enum)]
    pub date_mode: Option<DateModeArg>,

    #[arg(long = "date-format", value_enum)]
    pub date_format: Option<DateFormatArg>,
}

#[derive(Debug, Clone, Parser)]
pub struct SplitArgs {
    /// Bulk extract CSV to split
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Country reference table, local path or URL (defaults to the configured one)
    #[arg(long = "countries", value_name = "SOURCE")]
    pub countries_source: Option<String>,

    /// Output directory
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = "output")]
    pub output_path: PathBuf,

    /// File name prefix; files are named <prefix>_<ISO3>.csv
    #[arg(long = "prefix", default_value = "")]
    pub prefix: String,

    /// Encoding label of the input file
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Append recurring countries to their first file instead of numbering runs
    #[arg(long = "merge-runs")]
    pub merge_runs: bool,

    /// Add a canonical country name column
    #[arg(long = "country-name")]
    pub country_name: bool,

    #[arg(long = "date-mode", value_enum)]
    pub date_mode: Option<DateModeArg>,

    /// Print the grouping report as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct CountriesArgs {
    /// Country reference table, local path or URL (defaults to the configured one)
    #[arg(long = "countries", value_name = "SOURCE")]
    pub countries_source: Option<String>,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateModeArg {
    Dates,
    Years,
}

impl From<DateModeArg> for DateMode {
    fn from(arg: DateModeArg) -> Self {
        match arg {
            DateModeArg::Dates => DateMode::Dates,
            DateModeArg::Years => DateMode::Years,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateFormatArg {
    Iso,
    UsSlashed,
}

impl From<DateFormatArg> for DateRangeFormat {
    fn from(arg: DateFormatArg) -> Self {
        match arg {
            DateFormatArg::Iso => DateRangeFormat::Iso,
            DateFormatArg::UsSlashed => DateRangeFormat::UsSlashed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
    Csv,
}

impl SplitArgs {
    pub fn grouping_policy(&self) -> GroupingPolicy {
        if self.merge_runs {
            GroupingPolicy::MergeRuns
        } else {
            GroupingPolicy::ContiguousRuns
        }
    }
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args() {
        let args = Args::try_parse_from([
            "faostat-processor",
            "-vv",
            "split",
            "Prices.csv",
            "--prefix",
            "Prices",
            "--merge-runs",
            "--date-mode",
            "years",
        ])
        .unwrap();
        assert_eq!(args.get_log_level(), "debug");
        let Some(Commands::Split(split)) = args.command else {
            panic!("expected split command");
        };
        assert_eq!(split.input, PathBuf::from("Prices.csv"));
        assert_eq!(split.grouping_policy(), GroupingPolicy::MergeRuns);
        assert_eq!(split.date_mode.map(DateMode::from), Some(DateMode::Years));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "faostat-processor",
            "run",
            "--config",
            "faostat.yml",
            "--quiet",
            "--country",
            "AFG",
            "--country",
            "ALB",
        ])
        .unwrap();
        assert!(args.quiet);
        assert!(!args.show_progress());
        assert_eq!(args.config_file, Some(PathBuf::from("faostat.yml")));
        let Some(Commands::Run(run)) = args.command else {
            panic!("expected run command");
        };
        assert_eq!(run.countries, vec!["AFG", "ALB"]);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["faostat-processor", "-q", "-v", "countries"]).is_err());
    }
}
