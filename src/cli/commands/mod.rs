//! Command implementations for the FAOSTAT processor CLI
//!
//! Each subcommand lives in its own module:
//! - `run`: download categories and write every country's extracts and metadata
//! - `split`: split one local extract by country
//! - `countries`: list the accepted countries

pub mod countries;
pub mod run;
pub mod shared;
pub mod split;

pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use anyhow::{Result, bail};

/// Main command runner
pub fn run(args: Args) -> Result<ProcessingStats> {
    shared::setup_logging(&args);
    let config = shared::load_configuration(&args)?;

    match &args.command {
        Some(Commands::Run(run_args)) => run::run_all(run_args, config, args.show_progress()),
        Some(Commands::Split(split_args)) => split::run_split(split_args, config),
        Some(Commands::Countries(countries_args)) => {
            countries::run_countries(countries_args, &config)
        }
        None => bail!("no command given"),
    }
}
