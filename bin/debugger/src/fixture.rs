//! Recorded chain data and executor responses.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tracing::debug;
use zkr_debug::InMemoryChainState;
use zkr_executor::{
    ExecutorClient, ExecutorClientError, ProcessBatchRequestV1, ProcessBatchRequestV2,
    ProcessBatchResponse,
};
use zkr_tracers::InMemoryStateView;

/// Everything the debugger reads for one block, recorded ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fixture {
    /// Persisted chain data.
    pub chain: InMemoryChainState,
    /// Account state replayed tracers read.
    pub state: InMemoryStateView,
    /// Executor responses, by batch number.
    pub responses: BTreeMap<u64, ProcessBatchResponse>,
}

impl Fixture {
    /// Reads a JSON fixture from `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture from '{}'", path.display()))
    }
}

/// An [`ExecutorClient`] answering with recorded responses.
///
/// Requests are matched by the batch they replay, one past their `old_batch_num`.
#[derive(Debug, Clone, Default)]
pub struct RecordedExecutor {
    responses: BTreeMap<u64, ProcessBatchResponse>,
}

impl RecordedExecutor {
    /// Creates a new [`RecordedExecutor`].
    pub const fn new(responses: BTreeMap<u64, ProcessBatchResponse>) -> Self {
        Self { responses }
    }

    fn respond(&self, old_batch_num: u64) -> Result<ProcessBatchResponse, ExecutorClientError> {
        let batch_number = old_batch_num.saturating_add(1);
        debug!(target: "debugger", batch_number, "Serving recorded executor response");
        self.responses.get(&batch_number).cloned().ok_or_else(|| {
            ExecutorClientError::Transport(format!("no recorded response for batch {batch_number}"))
        })
    }
}

#[async_trait]
impl ExecutorClient for RecordedExecutor {
    async fn process_batch(
        &self,
        request: &ProcessBatchRequestV1,
    ) -> Result<ProcessBatchResponse, ExecutorClientError> {
        self.respond(request.base.old_batch_num)
    }

    async fn process_batch_v2(
        &self,
        request: &ProcessBatchRequestV2,
    ) -> Result<ProcessBatchResponse, ExecutorClientError> {
        self.respond(request.base.old_batch_num)
    }
}
