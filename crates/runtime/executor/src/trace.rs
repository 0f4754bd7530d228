//! Execution trace recorded by the executor.

use alloy_primitives::{Address, B256, Bytes, U256};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

/// Kind of the top-level call of a transaction.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallKind {
    /// Message call to an existing account.
    #[default]
    #[display("CALL")]
    Call,
    /// Contract creation.
    #[display("CREATE")]
    Create,
}

/// Per-transaction context handed to tracers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationContext {
    /// Top-level call kind.
    #[serde(rename = "type")]
    pub kind: CallKind,
    /// Sender.
    pub from: Address,
    /// Call target, or the created address for a creation.
    pub to: Option<Address>,
    /// Call data.
    pub input: Bytes,
    /// Return data.
    pub output: Bytes,
    /// Gas limit.
    pub gas: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Transferred value.
    pub value: U256,
    /// Decimal gas price.
    pub gas_price: String,
    /// State root before the block.
    pub old_state_root: B256,
    /// Duration of the executor round-trip of the whole block.
    pub time: Duration,
}

/// Contract frame a step executes in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepContract {
    /// Executing account.
    pub address: Address,
    /// Caller of the frame.
    pub caller: Address,
    /// Value sent with the frame.
    pub value: U256,
    /// Frame input.
    pub input: Bytes,
    /// Gas available to the frame.
    pub gas: u64,
}

/// One executed opcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Step {
    /// Call depth, starting at 1 for the top-level frame.
    pub depth: u64,
    /// Program counter.
    pub pc: u64,
    /// Remaining gas before the opcode.
    pub gas: u64,
    /// Gas charged by the opcode.
    pub gas_cost: u64,
    /// Refund counter.
    pub refund: u64,
    /// Opcode byte.
    pub op: u8,
    /// Error raised by the opcode, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Executing frame.
    pub contract: StepContract,
    /// Stack, bottom first.
    pub stack: Vec<U256>,
    /// Memory snapshot.
    pub memory: Bytes,
    /// Memory size in bytes.
    pub memory_size: u64,
    /// Offset of the memory snapshot.
    pub memory_offset: u64,
    /// Return data of the last call.
    pub return_data: Bytes,
    /// Storage slots touched by the frame.
    pub storage: BTreeMap<B256, B256>,
}

/// Full trace of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FullTrace {
    /// Context, filled in by the caller before tracing.
    pub context: InstrumentationContext,
    /// Executed steps, in order.
    pub steps: Vec<Step>,
}
