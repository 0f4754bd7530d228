//! Chain context shared by all tracers of a transaction.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Identifies the transaction a tracer observes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracerContext {
    /// Hash of the including block.
    pub block_hash: B256,
    /// Number of the including block.
    pub block_number: u64,
    /// Position of the transaction in the block.
    pub tx_index: u64,
    /// Transaction hash.
    pub tx_hash: B256,
}
