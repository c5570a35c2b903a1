//! Dump mode: print the stored lines of one process

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logdroid_core::config::LogdroidConfig;
use logdroid_logcat::{DumpRow, LogDump};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute dump mode for `pid`.
pub fn execute(pid: u32, config: &LogdroidConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let report = collect(pid, config)?;
    info!(
        pid,
        database = %report.database,
        lines = report.lines.len(),
        "dumping stored lines"
    );
    writer.render(&report)
}

fn collect(pid: u32, config: &LogdroidConfig) -> Result<DumpReport, CliError> {
    let dump = LogDump::open(&config.store.path)?;
    Ok(DumpReport {
        pid,
        database: config.store.path.clone(),
        lines: dump.by_pid(pid)?,
    })
}

/// Stored lines of one process, in insertion order.
#[derive(Serialize)]
pub struct DumpReport {
    pub pid: u32,
    pub database: String,
    pub lines: Vec<DumpRow>,
}

impl Render for DumpReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for row in &self.lines {
            w.write_all(row.raw_line.as_bytes())?;
            if !row.raw_line.ends_with('\n') {
                writeln!(w)?;
            }
        }
        Ok(())
    }
}
