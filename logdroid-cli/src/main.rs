//! logdroid -- Android logcat process timeline and log store
//!
//! Parses logcat output into entries, fans them out to an HTML timeline
//! and/or a SQLite store, and dumps stored lines of one process.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use clap::Parser;
use tracing::info;

use logdroid_core::config::LogdroidConfig;

use crate::cli::Cli;
use crate::commands::parse::ParseArgs;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Configuration file used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "logdroid.toml";

fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli, &config) {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Load the configuration and apply command-line overrides on top.
///
/// Priority: CLI flags > environment > file > defaults.
fn resolve_config(cli: &Cli) -> Result<LogdroidConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => LogdroidConfig::load(path)?,
        None => LogdroidConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
    };

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if !cli.package_names.is_empty() {
        config.correlation.package_names = cli.package_names.clone();
    }
    if let Some(db) = &cli.db {
        config.store.path = db.display().to_string();
    }
    if cli.year.is_some() {
        config.parser.year = cli.year;
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: Cli, config: &LogdroidConfig) -> Result<(), CliError> {
    if let (true, Some(pid)) = (cli.dump, cli.pid) {
        let writer = OutputWriter::new(cli.format);
        return commands::dump::execute(pid, config, &writer);
    }

    let args = ParseArgs {
        sinks: cli.sinks(),
        inputs: cli.inputs,
        html_out: cli.html_out,
    };
    let stats = commands::parse::execute(&args, config)?;
    info!(
        lines = stats.lines,
        entries = stats.entries,
        orphans = stats.orphans,
        "logdroid finished"
    );
    Ok(())
}
