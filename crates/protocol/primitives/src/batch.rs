//! Batch types.

use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

/// A sequenced batch owning one or more consecutive L2 blocks.
///
/// [`Batch::batch_l2_data`] is the only source of the per-block L1 anchor metadata and must
/// be decoded rather than reconstructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Batch number.
    pub batch_number: u64,
    /// Accumulated input hash after this batch.
    pub acc_input_hash: B256,
    /// Global exit root the batch was sequenced with.
    pub global_exit_root: B256,
    /// Sequencer coinbase.
    pub coinbase: Address,
    /// Batch timestamp, in seconds.
    pub timestamp: u64,
    /// State root after the batch is applied.
    pub state_root: B256,
    /// Raw wire-encoded batch payload.
    pub batch_l2_data: Bytes,
}

/// A batch as it was sequenced on L1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualBatch {
    /// Batch number.
    pub batch_number: u64,
    /// L1 transaction that sequenced the batch.
    pub tx_hash: B256,
    /// Sequencer address on L1.
    pub coinbase: Address,
    /// L1 block the sequencing transaction was included in.
    pub l1_block_number: u64,
}
