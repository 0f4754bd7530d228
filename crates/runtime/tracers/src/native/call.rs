//! Nested call graph tracer.

use crate::{
    FrameEnd, FrameKind, FrameStart, ReplayEnv, Tracer, TracerError,
    utils::{memory_slice, stack_peek, word_to_slot},
};
use alloy_primitives::{Address, B256, Bytes, U64, U256};
use revm::bytecode::opcode;
use serde::{Deserialize, Serialize};
use zkr_executor::Step;

/// `Error(string)` selector.
const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Call tracer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallTracerConfig {
    /// Record the top-level call only.
    pub only_top_call: bool,
    /// Record emitted logs.
    pub with_log: bool,
}

/// A log emitted inside a call frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    /// Emitting contract.
    pub address: Address,
    /// Topics.
    pub topics: Vec<B256>,
    /// Data.
    pub data: Bytes,
    /// Number of child calls made before the log.
    pub position: U64,
}

/// One frame of the call graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Frame kind.
    #[serde(rename = "type")]
    pub kind: FrameKind,
    /// Caller.
    pub from: Address,
    /// Callee or created address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Transferred value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Gas available to the frame.
    pub gas: U64,
    /// Gas used by the frame.
    pub gas_used: U64,
    /// Input.
    pub input: Bytes,
    /// Output.
    #[serde(skip_serializing_if = "<[u8]>::is_empty")]
    pub output: Bytes,
    /// Error the frame ended with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Decoded revert reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
    /// Logs emitted by the frame.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<CallLog>,
    /// Child frames.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<Self>,
}

impl CallFrame {
    fn open(frame: &FrameStart) -> Self {
        Self {
            kind: frame.kind,
            from: frame.from,
            to: Some(frame.to),
            value: frame.kind.transfers_value().then_some(frame.value),
            gas: U64::from(frame.gas),
            gas_used: U64::ZERO,
            input: frame.input.clone(),
            output: Bytes::new(),
            error: None,
            revert_reason: None,
            logs: Vec::new(),
            calls: Vec::new(),
        }
    }

    fn close(&mut self, end: &FrameEnd) {
        self.gas_used = U64::from(end.gas_used);
        self.error = end.error.clone();
        self.output = end.output.clone();
        if let Some(error) = &self.error {
            if error == "execution reverted" {
                self.revert_reason = decode_revert_reason(&self.output);
            } else {
                self.output = Bytes::new();
            }
        }
    }

    /// Drops the logs of failed frames and of everything below them.
    fn clear_failed_logs(&mut self, parent_failed: bool) {
        let failed = parent_failed || self.error.is_some();
        if failed {
            self.logs.clear();
        }
        for call in &mut self.calls {
            call.clear_failed_logs(failed);
        }
    }
}

/// Builds the nested call graph of a transaction.
#[derive(Debug, Clone, Default)]
pub struct CallTracer {
    config: CallTracerConfig,
    stack: Vec<CallFrame>,
}

impl CallTracer {
    /// Creates a new [`CallTracer`].
    pub const fn new(config: CallTracerConfig) -> Self {
        Self { config, stack: Vec::new() }
    }

    /// Takes the finished call graph.
    pub fn take_root(&mut self) -> Option<CallFrame> {
        // Fold frames the replay left open into their parents.
        while self.stack.len() > 1 {
            let frame = self.stack.pop()?;
            self.stack.last_mut()?.calls.push(frame);
        }
        let mut root = self.stack.pop()?;
        root.clear_failed_logs(false);
        Some(root)
    }

    fn capture_log(&mut self, step: &Step) {
        let topics = usize::from(step.op - opcode::LOG0);
        let (Some(offset), Some(length)) = (stack_peek(step, 0), stack_peek(step, 1)) else {
            return;
        };
        let topics = (0..topics).filter_map(|i| stack_peek(step, 2 + i)).map(word_to_slot).collect();
        let Some(frame) = self.stack.last_mut() else { return };
        frame.logs.push(CallLog {
            address: step.contract.address,
            topics,
            data: memory_slice(step, offset, length),
            position: U64::from(frame.calls.len()),
        });
    }
}

impl Tracer for CallTracer {
    fn capture_start(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.stack.push(CallFrame::open(frame));
        Ok(())
    }

    fn capture_state(&mut self, _: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        let is_log = (opcode::LOG0..=opcode::LOG4).contains(&step.op);
        if self.config.with_log && is_log && step.error.is_none() {
            if self.config.only_top_call && step.depth > 1 {
                return Ok(());
            }
            self.capture_log(step);
        }
        Ok(())
    }

    fn capture_enter(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        if !self.config.only_top_call {
            self.stack.push(CallFrame::open(frame));
        }
        Ok(())
    }

    fn capture_exit(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        if self.config.only_top_call || self.stack.len() < 2 {
            return Ok(());
        }
        if let Some(mut frame) = self.stack.pop() {
            frame.close(end);
            if let Some(parent) = self.stack.last_mut() {
                parent.calls.push(frame);
            }
        }
        Ok(())
    }

    fn capture_end(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        if let Some(root) = self.stack.first_mut() {
            root.close(end);
        }
        Ok(())
    }

    fn result(&mut self, _: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
        let root = self
            .take_root()
            .ok_or_else(|| TracerError::Result("no call frame was captured".to_string()))?;
        serde_json::to_value(root).map_err(|err| TracerError::Result(err.to_string()))
    }
}

/// Decodes the message of an `Error(string)` revert payload.
fn decode_revert_reason(output: &[u8]) -> Option<String> {
    let payload = output.strip_prefix(&REVERT_SELECTOR)?;
    let length = U256::from_be_slice(payload.get(32..64)?).saturating_to::<usize>();
    let message = payload.get(64..64usize.checked_add(length)?)?;
    String::from_utf8(message.to_vec()).ok()
}
