//! Full run: collect categories, then plan one dataset per country and category

use super::shared::{ProcessingStats, build_downloader, create_progress_bar, load_country_index};
use crate::cli::args::RunArgs;
use crate::collector::IndicatorSetCollector;
use crate::config::FaostatConfig;
use crate::dataset::DatasetPlanner;
use crate::models::CountryRecord;
use anyhow::{Context, Result, bail};
use std::time::Instant;
use tracing::{error, info};

pub fn run_all(args: &RunArgs, mut config: FaostatConfig, show_progress: bool) -> Result<ProcessingStats> {
    let start = Instant::now();
    apply_overrides(args, &mut config);
    config.validate().context("Invalid configuration")?;
    if config.categories.is_empty() {
        bail!("No categories selected; add categories to the configuration file");
    }

    let downloader = build_downloader(&config)?;
    let cache_dir = config.resolved_cache_dir()?;
    info!("Using cache directory {}", cache_dir.display());

    let collector = IndicatorSetCollector::new(&downloader, &cache_dir, config.cache_max_age());
    let sets = collector
        .collect(&config.filelist_url, &config.categories)
        .context("Failed to collect indicator sets")?;

    let index = load_country_index(&config.countrygroup_url, &downloader)?;
    let countries: Vec<&CountryRecord> = index
        .countries()
        .iter()
        .filter(|c| {
            args.countries.is_empty()
                || args.countries.iter().any(|iso3| iso3.eq_ignore_ascii_case(&c.iso3))
        })
        .collect();

    let planner = DatasetPlanner::new(&config, &index, &downloader, args.output_path.join("resources"))?;
    let metadata_dir = args.output_path.join("metadata");

    let mut stats = ProcessingStats {
        countries_loaded: countries.len(),
        errors_encountered: sets.failed().len(),
        ..Default::default()
    };

    let total = (sets.len() * countries.len()) as u64;
    let progress = show_progress.then(|| create_progress_bar(total, "Planning datasets"));

    for (category_name, files) in sets.iter() {
        for country in &countries {
            if let Some(pb) = &progress {
                pb.set_message(format!("{} / {}", country.iso3, category_name));
            }
            match planner.plan(category_name, files, country) {
                Ok(Some(plan)) => match plan.write_json(&metadata_dir) {
                    Ok(path) => {
                        info!("Wrote {}", path.display());
                        stats.datasets_planned += 1;
                        stats.files_written += plan.resources.len();
                        stats.rows_written += plan.resources.iter().map(|r| r.rows).sum::<usize>();
                    }
                    Err(e) => {
                        error!("Failed to write metadata for {}: {}", plan.name, e);
                        stats.errors_encountered += 1;
                    }
                },
                Ok(None) => stats.datasets_skipped += 1,
                Err(e) => {
                    error!("{} for {} failed: {}", category_name, country.iso3, e);
                    stats.errors_encountered += 1;
                }
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }
    stats.processing_time = start.elapsed();
    stats.print_summary("FAOSTAT run complete");
    Ok(stats)
}

fn apply_overrides(args: &RunArgs, config: &mut FaostatConfig) {
    if let Some(path) = &args.cache_path {
        config.cache_dir = Some(path.clone());
    }
    if let Some(mode) = args.date_mode {
        config.date_mode = mode.into();
    }
    if let Some(format) = args.date_format {
        config.date_format = format.into();
    }
    if !args.categories.is_empty() {
        config
            .categories
            .retain(|name, _| args.categories.iter().any(|selected| selected == name));
    }
}
