//! Log flags shared by every command.

use crate::{LogFormat, LogRotation};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Log-related CLI arguments.
///
/// Verbosity levels: 1=ERROR, 2=WARN, 3=INFO (default), 4=DEBUG, 5=TRACE. `0` disables
/// stdout logging.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct LogArgs {
    /// Verbosity level (1=ERROR, 2=WARN, 3=INFO, 4=DEBUG, 5=TRACE).
    #[arg(
        short = 'v',
        long = "verbosity",
        action = ArgAction::Count,
        default_value = "3",
        env = "ZKR_LOG_LEVEL",
        global = true
    )]
    pub level: u8,

    /// Stdout log format.
    #[arg(long = "log-format", default_value = "full", env = "ZKR_LOG_FORMAT", global = true)]
    pub stdout_format: LogFormat,

    /// Directory for file logging. File logging is off unless set.
    #[arg(long = "log-dir", env = "ZKR_LOG_DIR", global = true)]
    pub file_directory: Option<PathBuf>,

    /// File log format.
    #[arg(long = "log-file-format", default_value = "json", global = true)]
    pub file_format: LogFormat,

    /// File log rotation.
    #[arg(long = "log-rotation", default_value = "never", global = true)]
    pub file_rotation: LogRotation,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            level: 3,
            stdout_format: LogFormat::Full,
            file_directory: None,
            file_format: LogFormat::Json,
            file_rotation: LogRotation::Never,
        }
    }
}
