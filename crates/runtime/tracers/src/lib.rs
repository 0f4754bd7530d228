#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::{StateViewError, TracerError};

mod config;
pub use config::{TraceConfig, TracerKind};

mod context;
pub use context::TracerContext;

mod state;
pub use state::{AccountState, InMemoryAccount, InMemoryStateView, PinnedState, StateView};

mod frame;
pub use frame::{FrameEnd, FrameKind, FrameStart};

mod tracer;
pub use tracer::{ReplayEnv, Tracer};

mod replay;
pub use replay::TraceReplayer;

mod structlog;
pub use structlog::{StructLogger, StructLoggerConfig};

pub mod native;

mod js;
pub use js::JsTracer;

mod builder;
pub use builder::build_tracer;

mod utils;
pub use utils::{is_precompile, opcode_name};
