//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, progress bars and the run
//! statistics every command reports.

use crate::cli::args::Args;
use crate::config::FaostatConfig;
use crate::country_index::{CountryIndex, Iso3Names};
use crate::download::HttpDownloader;
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Statistics reported at the end of every command
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Extract files written
    pub files_written: usize,
    /// Rows written across all extracts
    pub rows_written: usize,
    /// Dataset metadata records written
    pub datasets_planned: usize,
    /// Country/category pairs without any data
    pub datasets_skipped: usize,
    /// Units that failed and were skipped
    pub errors_encountered: usize,
    pub countries_loaded: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    pub fn print_summary(&self, title: &str) {
        println!();
        println!("{}", title.bright_green().bold());
        println!("{}", "━".repeat(41).bright_black());
        println!("   • Countries loaded: {}", self.countries_loaded);
        println!("   • Extract files written: {}", self.files_written);
        println!("   • Rows written: {}", self.rows_written);
        if self.datasets_planned > 0 || self.datasets_skipped > 0 {
            println!("   • Datasets planned: {}", self.datasets_planned);
            println!("   • Datasets without data: {}", self.datasets_skipped);
        }
        println!(
            "   • Processing time: {}",
            HumanDuration(self.processing_time)
        );
        if self.errors_encountered > 0 {
            println!(
                "{}",
                format!("   ⚠ Errors encountered: {}", self.errors_encountered).yellow()
            );
        }
        println!();
    }
}

/// Set up structured logging
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("faostat_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load the configuration file named on the command line, or defaults
pub fn load_configuration(args: &Args) -> Result<FaostatConfig> {
    let config = match &args.config_file {
        Some(path) => FaostatConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            info!("No configuration file given, using defaults");
            FaostatConfig::default()
        }
    };
    Ok(config)
}

pub fn build_downloader(config: &FaostatConfig) -> Result<HttpDownloader> {
    HttpDownloader::new(&config.user_agent, config.timeout()).context("Failed to create HTTP client")
}

/// Load the country index from `source` and log what was rejected
pub fn load_country_index(source: &str, downloader: &HttpDownloader) -> Result<CountryIndex> {
    let (index, stats) = CountryIndex::load(source, downloader, &Iso3Names::new())
        .with_context(|| format!("Failed to load country reference table {}", source))?;
    if !stats.unknown_iso3.is_empty() {
        warn!(
            "{} ISO3 codes unknown to the name table: {}",
            stats.unknown_iso3.len(),
            stats.unknown_iso3.join(", ")
        );
    }
    info!(
        "Country index ready: {} countries, {} area codes ({:?})",
        index.country_count(),
        index.mapping_count(),
        stats.build_duration
    );
    Ok(index)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
