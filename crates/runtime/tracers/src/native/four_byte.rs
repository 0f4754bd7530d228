//! Function selector counter.

use crate::{FrameStart, ReplayEnv, Tracer, TracerError, is_precompile};
use alloy_primitives::hex;
use std::collections::BTreeMap;

/// Counts `selector-calldatasize` pairs of every call made by a transaction.
///
/// Creations, self-destructs and precompile calls are ignored, except for the top-level call
/// which is always recorded when its input carries a selector.
#[derive(Debug, Clone, Default)]
pub struct FourByteTracer {
    ids: BTreeMap<String, u64>,
}

impl FourByteTracer {
    /// Creates a new [`FourByteTracer`].
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&mut self, input: &[u8]) {
        let key = format!("0x{}-{}", hex::encode(&input[..4]), input.len() - 4);
        *self.ids.entry(key).or_default() += 1;
    }
}

impl Tracer for FourByteTracer {
    fn capture_start(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        if frame.input.len() >= 4 {
            self.store(&frame.input);
        }
        Ok(())
    }

    fn capture_enter(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        if frame.input.len() < 4 || !frame.kind.is_call() || is_precompile(&frame.to) {
            return Ok(());
        }
        self.store(&frame.input);
        Ok(())
    }

    fn result(&mut self, _: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
        serde_json::to_value(&self.ids).map_err(|err| TracerError::Result(err.to_string()))
    }
}
