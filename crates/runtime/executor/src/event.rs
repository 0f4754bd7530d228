//! Audit log for executor failures.

use crate::{ExecutorErrorCode, ProcessBatchRequest};
use auto_impl::auto_impl;
use std::fmt::Debug;
use tracing::error;

/// Sink for audit events raised when the executor rejects a request.
#[auto_impl(&, Box, Arc)]
pub trait EventLog: Send + Sync + Debug {
    /// Records that `request` failed with `code`.
    fn log_executor_error(&self, code: ExecutorErrorCode, request: &ProcessBatchRequest);
}

/// [`EventLog`] writing audit events to the `executor` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log_executor_error(&self, code: ExecutorErrorCode, request: &ProcessBatchRequest) {
        let base = request.base();
        let payload = serde_json::to_string(request).unwrap_or_default();
        error!(
            target: "executor",
            code = code.code(),
            %code,
            fork_id = base.fork_id,
            old_batch_num = base.old_batch_num,
            context_id = %base.context_id,
            v2 = request.is_v2(),
            %payload,
            "Executor rejected batch"
        );
    }
}
