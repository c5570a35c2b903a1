//! Parse mode: read logcat input and feed the selected sinks

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use logdroid_core::config::LogdroidConfig;
use logdroid_core::parser::{ParseStats, Parser};
use logdroid_core::pipeline::{EntrySink, FanOut};
use logdroid_core::text::LineReader;
use logdroid_logcat::{CorrelationContext, LogStore, LogcatClassifier, LogcatEntry};

use crate::cli::SinkKind;
use crate::error::CliError;

/// Options of one parse run, resolved from the command line.
pub struct ParseArgs {
    /// Input files in order; stdin when empty.
    pub inputs: Vec<PathBuf>,
    /// Sinks in fan-out order.
    pub sinks: Vec<SinkKind>,
    /// HTML destination; stdout when `None`.
    pub html_out: Option<PathBuf>,
}

/// Execute parse mode.
///
/// Every input is opened before any sink is created, so a missing input
/// file leaves no empty database behind.
pub fn execute(args: &ParseArgs, config: &LogdroidConfig) -> Result<ParseStats, CliError> {
    if args.html_out.is_some() && !args.sinks.contains(&SinkKind::Html) {
        return Err(CliError::Usage(
            "--html-out requires --output html".to_owned(),
        ));
    }

    let sources = open_inputs(&args.inputs)?;
    let mut fan = build_sinks(&args.sinks, args.html_out.as_deref(), config)?;
    let parser = Parser::new(LogcatClassifier::from_year(config.parser.year)?);

    info!(
        inputs = args.inputs.len(),
        sinks = ?fan.sink_names(),
        "parsing logcat input"
    );

    let stats = if sources.is_empty() {
        parser.parse(LineReader::stdin(), &mut fan)?
    } else {
        parser.parse_all(sources, &mut fan)?
    };

    Ok(stats)
}

fn open_inputs(paths: &[PathBuf]) -> Result<Vec<LineReader<std::io::BufReader<File>>>, CliError> {
    paths
        .iter()
        .map(|path| {
            LineReader::open(path).map_err(|source| CliError::Input {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}

/// Build the fan-out in the order the sinks were requested.
fn build_sinks(
    kinds: &[SinkKind],
    html_out: Option<&Path>,
    config: &LogdroidConfig,
) -> Result<FanOut<LogcatEntry>, CliError> {
    let mut fan = FanOut::new();

    for kind in kinds {
        let sink: Box<dyn EntrySink<LogcatEntry>> = match kind {
            SinkKind::Html => {
                let packages = config.correlation.tracked_packages();
                if packages.is_empty() {
                    warn!("no package names given, the timeline will have no columns");
                }
                let out: Box<dyn Write> = match html_out {
                    Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                    None => Box::new(BufWriter::new(std::io::stdout())),
                };
                Box::new(
                    CorrelationContext::new(packages, out)?
                        .with_title(config.html.title.clone())
                        .with_system_process_name(
                            config.correlation.system_process_name.clone(),
                        ),
                )
            }
            SinkKind::Db => Box::new(
                LogStore::open(&config.store.path)?.with_batch_size(config.store.batch_size),
            ),
        };
        fan = fan.register(sink);
    }

    Ok(fan)
}
