//! CLI flags.

mod trace;
pub use trace::TraceArgs;

mod config;
pub use config::load_config;
