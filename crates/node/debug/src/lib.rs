#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::{DebugError, EntryNotFoundError, StorageError};

mod storage;
pub use storage::{ChainStateReader, Snapshot};

mod memory;
pub use memory::InMemoryChainState;

mod config;
pub use config::{DebugConfig, MOCK_L1_INFO_ROOT};

mod anchor;
pub use anchor::AnchorResolver;

mod request;
pub use request::{L1Anchor, RequestBuilder, RequestInputs};

mod dispatch;
pub use dispatch::{TraceDispatcher, instrumentation_context, parse_gas_price, recover_sender};

mod debugger;
pub use debugger::BlockDebugger;

#[cfg(feature = "metrics")]
mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::Metrics;
