//! List the countries accepted from the reference table

use super::shared::{ProcessingStats, build_downloader, load_country_index};
use crate::cli::args::{CountriesArgs, ListFormat};
use crate::config::FaostatConfig;
use anyhow::Result;
use colored::Colorize;
use std::io;
use std::time::Instant;

pub fn run_countries(args: &CountriesArgs, config: &FaostatConfig) -> Result<ProcessingStats> {
    let start = Instant::now();
    let downloader = build_downloader(config)?;
    let source = args
        .countries_source
        .as_deref()
        .unwrap_or(&config.countrygroup_url);
    let index = load_country_index(source, &downloader)?;

    match args.format {
        ListFormat::Table => {
            println!(
                "{:<6} {:<6} {:<40} {}",
                "Code".bold(),
                "ISO3".bold(),
                "Name".bold(),
                "Source name".bold()
            );
            for country in index.countries() {
                println!(
                    "{:<6} {:<6} {:<40} {}",
                    country.source_code,
                    country.iso3.bright_cyan(),
                    country.canonical_name,
                    country.original_name.bright_black()
                );
            }
            println!();
            println!(
                "{} countries from {} area codes",
                index.country_count().to_string().bright_green(),
                index.mapping_count()
            );
        }
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(index.countries())?);
        }
        ListFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for country in index.countries() {
                writer.serialize(country)?;
            }
            writer.flush()?;
        }
    }

    Ok(ProcessingStats {
        countries_loaded: index.country_count(),
        processing_time: start.elapsed(),
        ..Default::default()
    })
}
