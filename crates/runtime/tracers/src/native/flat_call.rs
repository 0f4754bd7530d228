//! Parity-style flat call tracer.

use super::{CallFrame, CallTracer, CallTracerConfig};
use crate::{
    FrameEnd, FrameKind, FrameStart, ReplayEnv, Tracer, TracerContext, TracerError, is_precompile,
};
use alloy_primitives::{Address, B256, Bytes, U64, U256};
use serde::{Deserialize, Serialize};
use zkr_executor::Step;

/// Flat call tracer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlatCallTracerConfig {
    /// Translate error messages into their parity wording.
    pub convert_parity_errors: bool,
    /// Keep calls to precompiled contracts.
    pub include_precompiles: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatCallAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    call_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creation_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    init: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<U256>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatCallResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<Bytes>,
    gas_used: U64,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Bytes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatCallFrame {
    action: FlatCallAction,
    block_hash: B256,
    block_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<FlatCallResult>,
    subtraces: usize,
    trace_address: Vec<usize>,
    transaction_hash: B256,
    transaction_position: u64,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Flattens the call graph of a transaction into parity-style traces.
#[derive(Debug, Clone)]
pub struct FlatCallTracer {
    inner: CallTracer,
    config: FlatCallTracerConfig,
    context: TracerContext,
    limit: Option<u64>,
}

impl FlatCallTracer {
    /// Creates a new [`FlatCallTracer`].
    pub const fn new(context: TracerContext, config: FlatCallTracerConfig) -> Self {
        Self { inner: CallTracer::new(CallTracerConfig { only_top_call: false, with_log: false }), config, context, limit: None }
    }

    /// Caps the number of returned traces. `None` or `0` returns all of them.
    pub const fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    fn keep(&self, frame: &CallFrame) -> bool {
        self.config.include_precompiles
            || !(frame.kind.is_call() && frame.to.as_ref().is_some_and(is_precompile))
    }

    fn flatten(&self, frame: &CallFrame, trace_address: Vec<usize>, out: &mut Vec<FlatCallFrame>) {
        let children: Vec<&CallFrame> = frame.calls.iter().filter(|call| self.keep(call)).collect();
        out.push(self.flat_frame(frame, trace_address.clone(), children.len()));
        for (index, child) in children.into_iter().enumerate() {
            let mut child_address = trace_address.clone();
            child_address.push(index);
            self.flatten(child, child_address, out);
        }
    }

    fn flat_frame(&self, frame: &CallFrame, trace_address: Vec<usize>, subtraces: usize) -> FlatCallFrame {
        let (kind, action, result) = match frame.kind {
            FrameKind::Create | FrameKind::Create2 => (
                "create",
                FlatCallAction {
                    creation_method: Some(frame.kind.as_str().to_lowercase()),
                    from: Some(frame.from),
                    gas: Some(frame.gas),
                    init: Some(frame.input.clone()),
                    value: frame.value,
                    ..FlatCallAction::empty()
                },
                FlatCallResult {
                    address: frame.to,
                    code: Some(frame.output.clone()),
                    gas_used: frame.gas_used,
                    output: None,
                },
            ),
            FrameKind::SelfDestruct => (
                "suicide",
                FlatCallAction {
                    address: Some(frame.from),
                    refund_address: frame.to,
                    balance: frame.value,
                    ..FlatCallAction::empty()
                },
                FlatCallResult { address: None, code: None, gas_used: frame.gas_used, output: None },
            ),
            _ => (
                "call",
                FlatCallAction {
                    call_type: Some(frame.kind.as_str().to_lowercase()),
                    from: Some(frame.from),
                    to: frame.to,
                    gas: Some(frame.gas),
                    input: Some(frame.input.clone()),
                    value: Some(frame.value.unwrap_or_default()),
                    ..FlatCallAction::empty()
                },
                FlatCallResult {
                    address: None,
                    code: None,
                    gas_used: frame.gas_used,
                    output: Some(frame.output.clone()),
                },
            ),
        };

        let error = frame.error.as_deref().map(|error| {
            if self.config.convert_parity_errors { parity_error(error) } else { error.to_string() }
        });
        FlatCallFrame {
            action,
            block_hash: self.context.block_hash,
            block_number: self.context.block_number,
            result: error.is_none().then_some(result),
            error,
            subtraces,
            trace_address,
            transaction_hash: self.context.tx_hash,
            transaction_position: self.context.tx_index,
            kind,
        }
    }
}

impl FlatCallAction {
    const fn empty() -> Self {
        Self {
            call_type: None,
            creation_method: None,
            from: None,
            to: None,
            gas: None,
            input: None,
            init: None,
            value: None,
            address: None,
            refund_address: None,
            balance: None,
        }
    }
}

impl Tracer for FlatCallTracer {
    fn capture_start(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.inner.capture_start(env, frame)
    }

    fn capture_state(&mut self, env: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        self.inner.capture_state(env, step)
    }

    fn capture_enter(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.inner.capture_enter(env, frame)
    }

    fn capture_exit(&mut self, env: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        self.inner.capture_exit(env, end)
    }

    fn capture_end(&mut self, env: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        self.inner.capture_end(env, end)
    }

    fn result(&mut self, _: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
        let root = self
            .inner
            .take_root()
            .ok_or_else(|| TracerError::Result("no call frame was captured".to_string()))?;
        let mut traces = Vec::new();
        self.flatten(&root, Vec::new(), &mut traces);
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            traces.truncate(limit as usize);
        }
        serde_json::to_value(traces).map_err(|err| TracerError::Result(err.to_string()))
    }
}

/// Maps an execution error to its parity wording.
fn parity_error(error: &str) -> String {
    let converted = match error {
        "out of gas" |
        "contract creation code storage out of gas" |
        "gas uint64 overflow" |
        "max code size exceeded" => "Out of gas",
        "invalid jump destination" => "Bad jump destination",
        "execution reverted" => "Reverted",
        "return data out of bounds" => "Out of bounds",
        "precompiled failed" | "invalid input length" => "Built-in failed",
        _ if error.starts_with("stack limit reached") => "Out of stack",
        _ if error.starts_with("invalid opcode") => "Bad instruction",
        _ if error.starts_with("stack underflow") => "Stack underflow",
        _ => error,
    };
    converted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryStateView, PinnedState, TraceReplayer, replay::tests::step};
    use revm::bytecode::opcode;
    use rstest::rstest;
    use zkr_executor::{FullTrace, InstrumentationContext};

    fn steps() -> Vec<Step> {
        let outer = Address::with_last_byte(0x10);
        let inner = Address::with_last_byte(0x20);
        let mut precompile_call = step(2, opcode::STATICCALL, inner);
        // argsLength, argsOffset, address, gas (bottom first)
        precompile_call.stack = vec![U256::ZERO, U256::ZERO, U256::from(1), U256::from(100)];
        vec![
            step(1, opcode::CALL, outer),
            precompile_call,
            step(2, opcode::REVERT, inner),
            step(1, opcode::STOP, outer),
        ]
    }

    fn run(config: FlatCallTracerConfig, limit: Option<u64>) -> serde_json::Value {
        let view = InMemoryStateView::default();
        let context = InstrumentationContext {
            from: Address::with_last_byte(0xaa),
            to: Some(Address::with_last_byte(0x10)),
            ..Default::default()
        };
        let env = ReplayEnv::new(U256::from(1), PinnedState::new(&view, B256::ZERO), &context);
        let trace = FullTrace { context: context.clone(), steps: steps() };
        let tracer_context = TracerContext {
            block_hash: B256::repeat_byte(0xbb),
            block_number: 12,
            tx_index: 1,
            tx_hash: B256::repeat_byte(0xcc),
        };
        let mut tracer = FlatCallTracer::new(tracer_context, config).with_limit(limit);
        TraceReplayer::new(env, &trace, None).run(&mut tracer).unwrap()
    }

    #[test]
    fn test_flat_call_frames() {
        let traces = run(FlatCallTracerConfig::default(), None);
        let traces = traces.as_array().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0]["type"], "call");
        assert_eq!(traces[0]["subtraces"], 1);
        assert_eq!(traces[0]["blockNumber"], 12);
        assert_eq!(traces[0]["transactionPosition"], 1);
        assert_eq!(traces[1]["traceAddress"], serde_json::json!([0]));
        assert_eq!(traces[1]["error"], "execution reverted");
        assert!(traces[1].get("result").is_none());
    }

    #[test]
    fn test_flat_call_precompiles_and_parity_errors() {
        let config = FlatCallTracerConfig { convert_parity_errors: true, include_precompiles: true };
        let traces = run(config, None);
        let traces = traces.as_array().unwrap();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[1]["error"], "Reverted");
        assert_eq!(traces[2]["action"]["callType"], "staticcall");
        assert_eq!(traces[2]["traceAddress"], serde_json::json!([0, 0]));
    }

    #[rstest]
    #[case(Some(1), 1)]
    #[case(Some(0), 2)]
    #[case(None, 2)]
    fn test_flat_call_limit(#[case] limit: Option<u64>, #[case] expected: usize) {
        assert_eq!(run(FlatCallTracerConfig::default(), limit).as_array().unwrap().len(), expected);
    }

    #[rstest]
    #[case("out of gas", "Out of gas")]
    #[case("stack limit reached 1024 (1023)", "Out of stack")]
    #[case("invalid opcode: INVALID", "Bad instruction")]
    #[case("something else", "something else")]
    fn test_parity_error(#[case] error: &str, #[case] expected: &str) {
        assert_eq!(parity_error(error), expected);
    }
}
