mod agents;
mod cli;
mod config;
mod error;
mod hjson;
mod utils;
mod version;
mod workflow;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::{RunContext, SyncConfig};
use error::Result;
use std::process;
use utils::path_validator::PathValidator;
use workflow::SyncOutcome;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<SyncOutcome> {
    let repo_root = PathValidator::validate_project_path(&cli.path)?;
    let config = SyncConfig::new(repo_root, &cli.client_dir);
    let context = RunContext::from_env();

    let outcome = workflow::execute_sync(&config, &context)?;
    log::info!("Sync finished: {outcome:?}");
    Ok(outcome)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
