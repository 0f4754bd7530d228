#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::{AdapterError, ExecutorClientError, ReconcileError};

mod code;
pub use code::ExecutorErrorCode;

mod request;
pub use request::{
    BatchRequestBase, ProcessBatchRequest, ProcessBatchRequestV1, ProcessBatchRequestV2,
    TraceCaptureConfig,
};

mod response;
pub use response::{BlockResponse, ProcessBatchResponse, TransactionResponse};

mod trace;
pub use trace::{CallKind, FullTrace, InstrumentationContext, Step, StepContract};

mod result;
pub use result::ExecutionResult;

mod client;
pub use client::ExecutorClient;

mod event;
pub use event::{EventLog, TracingEventLog};

mod adapter;
pub use adapter::{ExecutionServiceAdapter, TimedResponse};

mod reconcile;
pub use reconcile::reconcile;
