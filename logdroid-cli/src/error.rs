//! CLI-specific error types and exit code mapping

use logdroid_core::error::LogdroidError;
use logdroid_logcat::LogcatError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid combination of command-line options.
    #[error("{0}")]
    Usage(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// A logcat input file could not be opened.
    #[error("cannot open input '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error (stdout write, HTML output file, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logdroid-core and logdroid-logcat.
    #[error("{0}")]
    Core(#[from] LogdroidError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General error                        |
    /// | 2    | Configuration or usage error         |
    /// | 3    | Fatal parse error (unknown level)    |
    /// | 4    | Storage error                        |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Core(LogdroidError::Config(_)) => 2,
            Self::Core(LogdroidError::Parse(_)) => 3,
            Self::Core(LogdroidError::Storage(_)) => 4,
            Self::Input { .. } | Self::Io(_) | Self::Core(LogdroidError::Io(_)) => 10,
            Self::JsonSerialize(_) => 1,
        }
    }
}

impl From<LogcatError> for CliError {
    fn from(e: LogcatError) -> Self {
        Self::Core(e.into())
    }
}
