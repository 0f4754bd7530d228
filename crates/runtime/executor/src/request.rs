//! Executor request types.

use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};
use zkr_primitives::L1InfoTreeData;

/// Which parts of the machine state the executor records in its full trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceCaptureConfig {
    /// Skip storage capture.
    pub disable_storage: bool,
    /// Skip stack capture.
    pub disable_stack: bool,
    /// Capture memory.
    pub enable_memory: bool,
    /// Capture return data.
    pub enable_return_data: bool,
}

impl TraceCaptureConfig {
    /// Captures everything the executor can record.
    pub const FULL: Self = Self {
        disable_storage: false,
        disable_stack: false,
        enable_memory: true,
        enable_return_data: true,
    };

    /// Returns `true` if nothing is left out of the capture.
    pub const fn is_full(&self) -> bool {
        !self.disable_storage && !self.disable_stack && self.enable_memory && self.enable_return_data
    }
}

impl Default for TraceCaptureConfig {
    fn default() -> Self {
        Self::FULL
    }
}

/// Fields shared by both executor protocol generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequestBase {
    /// Number of the batch preceding the replayed one.
    pub old_batch_num: u64,
    /// State root the replay starts from.
    pub old_state_root: B256,
    /// Accumulated input hash of the preceding batch.
    pub old_acc_input_hash: B256,
    /// Encoded transactions to execute.
    pub batch_l2_data: Bytes,
    /// Sequencer coinbase.
    pub coinbase: Address,
    /// L2 chain id.
    pub chain_id: u64,
    /// Fork id the payload is encoded for.
    pub fork_id: u64,
    /// Trace capture settings.
    pub trace_config: TraceCaptureConfig,
    /// Correlation id of the call.
    pub context_id: String,
}

/// Request accepted by executors before the Etrog fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBatchRequestV1 {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BatchRequestBase,
    /// Global exit root of the batch.
    pub global_exit_root: B256,
    /// Batch timestamp.
    pub eth_timestamp: u64,
}

/// Request accepted by executors from the Etrog fork on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessBatchRequestV2 {
    /// Shared fields.
    #[serde(flatten)]
    pub base: BatchRequestBase,
    /// L1 info root the executor verifies anchors against.
    pub l1_info_root: B256,
    /// Upper bound for block timestamps.
    pub timestamp_limit: u64,
    /// Whether the executor ignores the first change-L2-block of the payload.
    pub skip_first_change_l2_block: bool,
    /// Whether the executor skips writing the block info root.
    pub skip_write_block_info_root: bool,
    /// L1 block hash used directly for a network-injected first block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_blockhash_l1: Option<B256>,
    /// Whether the executor skips L1 info root verification.
    pub skip_verify_l1_info_root: bool,
    /// Anchor data for the L1 info tree indices the payload references.
    #[serde(default, skip_serializing_if = "L1InfoTreeData::is_empty")]
    pub l1_info_tree_data: L1InfoTreeData,
}

/// An executor request of either protocol generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum ProcessBatchRequest {
    /// Pre-Etrog request.
    V1(ProcessBatchRequestV1),
    /// Etrog and later request.
    V2(ProcessBatchRequestV2),
}

impl ProcessBatchRequest {
    /// Returns the fields shared by both generations.
    pub const fn base(&self) -> &BatchRequestBase {
        match self {
            Self::V1(request) => &request.base,
            Self::V2(request) => &request.base,
        }
    }

    /// Returns `true` for an Etrog-and-later request.
    pub const fn is_v2(&self) -> bool {
        matches!(self, Self::V2(_))
    }

    /// Returns the v1 request, if this is one.
    pub const fn as_v1(&self) -> Option<&ProcessBatchRequestV1> {
        match self {
            Self::V1(request) => Some(request),
            Self::V2(_) => None,
        }
    }

    /// Returns the v2 request, if this is one.
    pub const fn as_v2(&self) -> Option<&ProcessBatchRequestV2> {
        match self {
            Self::V2(request) => Some(request),
            Self::V1(_) => None,
        }
    }
}

impl From<ProcessBatchRequestV1> for ProcessBatchRequest {
    fn from(request: ProcessBatchRequestV1) -> Self {
        Self::V1(request)
    }
}

impl From<ProcessBatchRequestV2> for ProcessBatchRequest {
    fn from(request: ProcessBatchRequestV2) -> Self {
        Self::V2(request)
    }
}
