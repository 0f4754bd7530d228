//! Transaction receipt reference.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Per-transaction outcome reference.
///
/// Only used to correlate traces with the block they belong to and to recover the price the
/// transaction was actually charged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Transaction hash.
    pub tx_hash: B256,
    /// Hash of the including block.
    pub block_hash: B256,
    /// Number of the including block.
    pub block_number: u64,
    /// Position of the transaction within its block.
    pub transaction_index: u64,
    /// Gas price the transaction was charged, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_gas_price: Option<u128>,
}
