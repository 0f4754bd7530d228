//! The default struct-log tracer.

use crate::{TracerError, opcode_name};
use alloy_primitives::{Bytes, U256, hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zkr_executor::{ExecutionResult, Step};

/// Struct logger toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructLoggerConfig {
    /// Skip storage.
    pub disable_storage: bool,
    /// Skip the stack.
    pub disable_stack: bool,
    /// Include memory.
    pub enable_memory: bool,
    /// Include return data.
    pub enable_return_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructLogRes {
    pc: u64,
    op: String,
    gas: u64,
    gas_cost: u64,
    depth: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<Vec<U256>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "is_zero")]
    refund: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_data: Option<Bytes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructLoggerResult {
    gas: u64,
    failed: bool,
    return_value: String,
    struct_logs: Vec<StructLogRes>,
}

const fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Renders the executor's own step list as struct logs. No replay is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructLogger {
    config: StructLoggerConfig,
}

impl StructLogger {
    /// Creates a new [`StructLogger`].
    pub const fn new(config: StructLoggerConfig) -> Self {
        Self { config }
    }

    /// Builds the struct-log trace of `result`.
    pub fn parse_trace(&self, result: &ExecutionResult) -> Result<serde_json::Value, TracerError> {
        let trace = StructLoggerResult {
            gas: result.gas_used,
            failed: result.error.is_some(),
            return_value: hex::encode(&result.return_value),
            struct_logs: result.full_trace.steps.iter().map(|step| self.log(step)).collect(),
        };
        serde_json::to_value(trace).map_err(|err| TracerError::Result(err.to_string()))
    }

    fn log(&self, step: &Step) -> StructLogRes {
        let config = &self.config;
        StructLogRes {
            pc: step.pc,
            op: opcode_name(step.op),
            gas: step.gas,
            gas_cost: step.gas_cost,
            depth: step.depth,
            error: step.error.clone(),
            stack: (!config.disable_stack).then(|| step.stack.clone()),
            memory: config
                .enable_memory
                .then(|| step.memory.chunks(32).map(hex::encode).collect()),
            storage: (!config.disable_storage).then(|| {
                step.storage
                    .iter()
                    .map(|(slot, value)| (hex::encode(slot), hex::encode(value)))
                    .collect()
            }),
            refund: step.refund,
            return_data: config.enable_return_data.then(|| step.return_data.clone()),
        }
    }
}
