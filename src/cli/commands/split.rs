//! Split one local extract into per-country files

use super::shared::{ProcessingStats, build_downloader, load_country_index};
use crate::annotator::RowAnnotator;
use crate::cli::args::SplitArgs;
use crate::config::FaostatConfig;
use crate::download::{encoding_for_label, open_rows};
use crate::writer::{GroupOutcome, GroupingWriter, TemplateNamer};
use anyhow::{Context, Result};
use colored::Colorize;
use std::time::Instant;
use tracing::info;

pub fn run_split(args: &SplitArgs, mut config: FaostatConfig) -> Result<ProcessingStats> {
    let start = Instant::now();
    if let Some(encoding) = &args.encoding {
        config.encoding = encoding.clone();
    }
    if let Some(mode) = args.date_mode {
        config.date_mode = mode.into();
    }
    config.grouping_policy = args.grouping_policy();
    config.emit_country_name |= args.country_name;
    config.validate().context("Invalid configuration")?;

    let downloader = build_downloader(&config)?;
    let source = args
        .countries_source
        .as_deref()
        .unwrap_or(&config.countrygroup_url);
    let index = load_country_index(source, &downloader)?;

    let encoding = encoding_for_label(&config.encoding)?;
    let table = open_rows(&args.input, encoding, config.header_rows)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    info!("Splitting {} by country", args.input.display());

    let writer = GroupingWriter::new(
        RowAnnotator::new(&index, config.annotator_options()),
        config.writer_options(),
    );
    let namer = TemplateNamer::new(&args.output_path, args.prefix.clone());
    let report = writer
        .process(&table.headers, table.rows, &namer)
        .with_context(|| format!("Failed to split {}", args.input.display()))?;

    let stats = ProcessingStats {
        files_written: report.files_written(),
        rows_written: report.rows_written,
        countries_loaded: index.country_count(),
        processing_time: start.elapsed(),
        ..Default::default()
    };

    if args.json {
        let written: Vec<_> = report.written().collect();
        println!("{}", serde_json::to_string_pretty(&written)?);
        return Ok(stats);
    }

    stats.print_summary("Split complete");
    println!("   • Rows read: {}", report.rows_read);
    println!("   • Rows with bad dates: {}", report.rows_rejected);
    println!("   • Rows without area code: {}", report.rows_missing_code);
    if let Some(bounds) = report.bounds() {
        println!("   • Date range: {}", bounds);
    }
    for outcome in &report.outcomes {
        match outcome {
            GroupOutcome::Written(output) => println!(
                "   {} {} ({} rows, {})",
                "✓".green(),
                output.path.display(),
                output.rows_written,
                output.bounds
            ),
            GroupOutcome::NoData { iso3, .. } => {
                println!("   {} {} has no valid rows", "–".yellow(), iso3)
            }
            GroupOutcome::Unmapped { country_code, rows } => println!(
                "   {} area code {} not in country index ({} rows skipped)",
                "✗".bright_black(),
                country_code,
                rows
            ),
        }
    }
    Ok(stats)
}
