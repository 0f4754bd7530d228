#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod args;
pub use args::LogArgs;

mod logging;
pub use logging::{
    FileLogConfig, LogConfig, LogRotation, StdoutLogConfig, verbosity_to_level_filter,
};

mod tracing;
pub use self::tracing::{LogFormat, init_test_tracing};

mod styles;
pub use styles::cli_styles;
