//! Instrumentation context construction and tracer dispatch.

use crate::DebugError;
use alloy_primitives::{Address, B256, U256};
use std::time::Duration;
use tracing::trace;
use zkr_executor::{CallKind, ExecutionResult, InstrumentationContext};
use zkr_primitives::L2Transaction;
use zkr_tracers::{
    PinnedState, ReplayEnv, StateView, StructLogger, TraceConfig, TraceReplayer, TracerContext,
    build_tracer,
};

/// Recovers the sender of `tx` from its signature.
pub fn recover_sender(tx: &L2Transaction) -> Result<Address, DebugError> {
    tx.recover_signer().map_err(|err| DebugError::SenderRecoveryFailed {
        tx_hash: *tx.hash(),
        reason: err.to_string(),
    })
}

/// Builds the context tracers observe `tx` with.
///
/// `time` is the executor round-trip of the whole batch.
pub fn instrumentation_context(
    tx: &L2Transaction,
    sender: Address,
    result: &ExecutionResult,
    old_state_root: B256,
    time: Duration,
) -> InstrumentationContext {
    let unsigned = tx.tx();
    let (kind, to) = match unsigned.to.to() {
        Some(target) => (CallKind::Call, Some(*target)),
        None => (CallKind::Create, result.create_address),
    };
    InstrumentationContext {
        kind,
        from: sender,
        to,
        input: unsigned.input.clone(),
        output: result.return_value.clone(),
        gas: unsigned.gas_limit,
        gas_used: result.gas_used,
        value: unsigned.value,
        gas_price: unsigned.gas_price.to_string(),
        old_state_root,
        time,
    }
}

/// Parses the decimal gas price of an [`InstrumentationContext`].
pub fn parse_gas_price(gas_price: &str) -> Result<U256, DebugError> {
    U256::from_str_radix(gas_price, 10)
        .map_err(|_| DebugError::GasPriceParseFailed(gas_price.to_string()))
}

/// Runs the configured tracer over execution results.
#[derive(Debug, Clone, Copy)]
pub struct TraceDispatcher<'a> {
    trace_config: &'a TraceConfig,
    state: PinnedState<'a>,
}

impl<'a> TraceDispatcher<'a> {
    /// Creates a dispatcher replaying against `state` pinned to `state_root`.
    pub fn new(trace_config: &'a TraceConfig, state: &'a dyn StateView, state_root: B256) -> Self {
        Self { trace_config, state: PinnedState::new(state, state_root) }
    }

    /// Produces the trace of `result`, whose recorded context must already be set.
    ///
    /// The struct logger reads the executor's trace directly. Every other tracer is replayed
    /// over it.
    pub fn trace(
        &self,
        result: &ExecutionResult,
        context: TracerContext,
        gas_price: U256,
    ) -> Result<serde_json::Value, DebugError> {
        let tracer = build_tracer(self.trace_config, context)
            .map_err(DebugError::TracerConstructionFailed)?;
        let Some(mut tracer) = tracer else {
            return StructLogger::new(self.trace_config.struct_logger_config())
                .parse_trace(result)
                .map_err(DebugError::Trace);
        };

        let env = ReplayEnv::new(gas_price, self.state, &result.full_trace.context);
        let trace = TraceReplayer::new(env, &result.full_trace, result.error.as_deref())
            .run(tracer.as_mut())
            .map_err(DebugError::Trace)?;
        trace!(target: "debug_block", tx_hash = %context.tx_hash, "Replayed transaction trace");
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, bytes};
    use rstest::rstest;
    use zkr_primitives::test_utils::{legacy_tx, test_sender};
    use zkr_tracers::InMemoryStateView;

    #[test]
    fn test_call_context() {
        let target = Address::repeat_byte(0x42);
        let tx = legacy_tx(3, Some(target), bytes!("a9059cbb"), Some(1001));
        let result = ExecutionResult {
            gas_used: 30_000,
            return_value: bytes!("01"),
            create_address: Some(Address::repeat_byte(0x99)),
            ..Default::default()
        };
        let sender = recover_sender(&tx).unwrap();
        assert_eq!(sender, test_sender());

        let context = instrumentation_context(
            &tx,
            sender,
            &result,
            B256::repeat_byte(0x01),
            Duration::from_millis(12),
        );
        assert_eq!(context.kind, CallKind::Call);
        assert_eq!(context.to, Some(target));
        assert_eq!(context.gas, 100_000);
        assert_eq!(context.gas_used, 30_000);
        assert_eq!(context.value, U256::from(3));
        assert_eq!(context.gas_price, "1000000000");
        assert_eq!(context.output, bytes!("01"));
        assert_eq!(context.old_state_root, B256::repeat_byte(0x01));
        assert_eq!(context.time, Duration::from_millis(12));
    }

    #[test]
    fn test_create_context_uses_created_address() {
        let tx = legacy_tx(0, None, bytes!("6080"), None);
        let created = Address::repeat_byte(0x99);
        let result = ExecutionResult { create_address: Some(created), ..Default::default() };
        let context =
            instrumentation_context(&tx, test_sender(), &result, B256::ZERO, Duration::ZERO);
        assert_eq!(context.kind, CallKind::Create);
        assert_eq!(context.to, Some(created));
    }

    #[rstest]
    #[case("1000000000", Some(U256::from(1_000_000_000u64)))]
    #[case("0", Some(U256::ZERO))]
    #[case("0x10", None)]
    fn test_parse_gas_price(#[case] raw: &str, #[case] expected: Option<U256>) {
        assert_eq!(parse_gas_price(raw).ok(), expected);
    }

    #[test]
    fn test_default_tracer_reads_struct_logs() {
        let view = InMemoryStateView::default();
        let trace_config = TraceConfig::default();
        let dispatcher = TraceDispatcher::new(&trace_config, &view, B256::ZERO);
        let result = ExecutionResult { gas_used: 21_000, ..Default::default() };
        let trace = dispatcher.trace(&result, TracerContext::default(), U256::from(1)).unwrap();
        assert_eq!(trace["gas"], 21_000);
        assert_eq!(trace["failed"], false);
    }

    #[test]
    fn test_replayed_tracer() {
        let view = InMemoryStateView::default();
        let trace_config =
            TraceConfig { tracer: Some("4byteTracer".to_string()), ..Default::default() };
        let dispatcher = TraceDispatcher::new(&trace_config, &view, B256::ZERO);
        let mut result = ExecutionResult::default();
        result.full_trace.context.input = Bytes::from_static(&[0xa9, 0x05, 0x9c, 0xbb, 0x00]);
        let trace = dispatcher.trace(&result, TracerContext::default(), U256::from(1)).unwrap();
        assert_eq!(trace, serde_json::json!({ "0xa9059cbb-1": 1 }));
    }

    #[test]
    fn test_tracer_construction_failure() {
        let view = InMemoryStateView::default();
        let trace_config = TraceConfig {
            tracer: Some("{ fault: function() {} }".to_string()),
            ..Default::default()
        };
        let dispatcher = TraceDispatcher::new(&trace_config, &view, B256::ZERO);
        let err = dispatcher
            .trace(&ExecutionResult::default(), TracerContext::default(), U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, DebugError::TracerConstructionFailed(_)));
    }
}
