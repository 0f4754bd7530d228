//! Executor response types.

use crate::{ExecutorErrorCode, FullTrace};
use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

/// Outcome of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Created contract address, for creations.
    pub create_address: Option<Address>,
    /// Gas left after execution.
    pub gas_left: u64,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Return data.
    pub return_value: Bytes,
    /// State root after the transaction.
    pub state_root: B256,
    /// Recorded execution trace.
    pub full_trace: FullTrace,
    /// Error raised during execution.
    pub rom_error: Option<String>,
}

/// Outcome of one L2 block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockResponse {
    /// Block number.
    pub block_number: u64,
    /// Transaction outcomes, in order.
    pub transaction_responses: Vec<TransactionResponse>,
}

/// Executor response, identical for both protocol generations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessBatchResponse {
    /// State root after the batch.
    pub new_state_root: B256,
    /// Block outcomes, in order.
    pub block_responses: Vec<BlockResponse>,
    /// Global status code.
    pub error: ExecutorErrorCode,
}
