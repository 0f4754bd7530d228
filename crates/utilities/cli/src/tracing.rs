//! [tracing_subscriber] utilities.

use crate::{LogConfig, LogRotation};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Layer,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// File name prefix of rotated log files.
const LOG_FILE_NAME: &str = "zkr-debugger.log";

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

impl LogConfig {
    /// Initializes the global tracing subscriber.
    ///
    /// `env_filter` defaults to the `RUST_LOG` environment; the configured level is added
    /// on top of it.
    pub fn init_tracing_subscriber(
        &self,
        env_filter: Option<EnvFilter>,
    ) -> Result<(), TryInitError> {
        let file_layer = self.file_logs.as_ref().map(|file_logs| {
            let directory_path = file_logs.directory_path.clone();
            let appender = match file_logs.rotation {
                LogRotation::Minutely => {
                    tracing_appender::rolling::minutely(directory_path, LOG_FILE_NAME)
                }
                LogRotation::Hourly => tracing_appender::rolling::hourly(directory_path, LOG_FILE_NAME),
                LogRotation::Daily => tracing_appender::rolling::daily(directory_path, LOG_FILE_NAME),
                LogRotation::Never => tracing_appender::rolling::never(directory_path, LOG_FILE_NAME),
            };

            match file_logs.format {
                LogFormat::Full => tracing_subscriber::fmt::layer().with_writer(appender).boxed(),
                LogFormat::Json => {
                    tracing_subscriber::fmt::layer().json().with_writer(appender).boxed()
                }
                LogFormat::Pretty => {
                    tracing_subscriber::fmt::layer().pretty().with_writer(appender).boxed()
                }
                LogFormat::Compact => {
                    tracing_subscriber::fmt::layer().compact().with_writer(appender).boxed()
                }
            }
        });

        // Stdout is reserved for command output.
        let stdout_layer = self.stdout_logs.as_ref().map(|stdout_logs| {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            match stdout_logs.format {
                LogFormat::Full => layer.boxed(),
                LogFormat::Json => layer.json().boxed(),
                LogFormat::Pretty => layer.pretty().boxed(),
                LogFormat::Compact => layer.compact().boxed(),
            }
        });

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stdout_layer)
            .try_init()
    }
}

/// Installs a default subscriber for tests. Later calls are no-ops.
pub fn init_test_tracing() {
    let _ = LogConfig::default().init_tracing_subscriber(None);
}
