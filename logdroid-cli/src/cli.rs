//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// logdroid -- Android logcat process timeline and log store.
///
/// Reads logcat output from files or stdin, groups lines by the process that
/// emitted them, and writes an HTML timeline and/or a SQLite log store.
#[derive(Parser, Debug)]
#[command(name = "logdroid", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logdroid.toml configuration file.
    ///
    /// When omitted, `logdroid.toml` is used if present and defaults otherwise.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Logcat input file. Repeat to parse several files in sequence (default: stdin).
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output sink. Repeat to fan out to several sinks (default: db).
    #[arg(short, long = "output", value_name = "SINK")]
    pub outputs: Vec<SinkKind>,

    /// Package names to track as timeline columns.
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub package_names: Vec<String>,

    /// Dump stored lines of one process instead of parsing.
    #[arg(long, requires = "pid")]
    pub dump: bool,

    /// Process ID to dump.
    #[arg(long, requires = "dump")]
    pub pid: Option<u32>,

    /// Override the SQLite database path.
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Write the HTML timeline to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub html_out: Option<PathBuf>,

    /// Year assumed for logcat timestamps (default: current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Dump output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Entry sinks selectable with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Per-process HTML timeline.
    Html,
    /// SQLite log store.
    Db,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Raw log lines.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Cli {
    /// Requested sinks in order, duplicates removed, `db` when none given.
    pub fn sinks(&self) -> Vec<SinkKind> {
        let mut sinks = Vec::new();
        for sink in &self.outputs {
            if !sinks.contains(sink) {
                sinks.push(*sink);
            }
        }
        if sinks.is_empty() {
            sinks.push(SinkKind::Db);
        }
        sinks
    }
}
