//! Per-transaction replay result.

use crate::{FullTrace, TransactionResponse};
use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

/// Outcome of replaying one transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Created contract address, for creations.
    pub create_address: Option<Address>,
    /// Gas left after execution.
    pub gas_left: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Return data.
    pub return_value: Bytes,
    /// State root after the transaction.
    pub state_root: B256,
    /// Raw trace recorded by the executor.
    pub full_trace: FullTrace,
    /// Execution error, if the transaction reverted or faulted.
    pub error: Option<String>,
    /// Trace produced by the selected tracer.
    pub trace_result: Option<serde_json::Value>,
}

impl From<TransactionResponse> for ExecutionResult {
    fn from(response: TransactionResponse) -> Self {
        Self {
            create_address: response.create_address,
            gas_left: response.gas_left,
            gas_used: response.gas_used,
            return_value: response.return_value,
            state_root: response.state_root,
            full_trace: response.full_trace,
            error: response.rom_error,
            trace_result: None,
        }
    }
}
