//! Drives tracers over a recorded execution.

use crate::{
    FrameEnd, FrameKind, FrameStart, ReplayEnv, Tracer, TracerError,
    utils::{memory_slice, stack_peek, word_to_address},
};
use alloy_primitives::{Bytes, U256};
use revm::bytecode::opcode;
use tracing::trace;
use zkr_executor::{CallKind, FullTrace, Step};

/// Error reported for frames ending in `REVERT`.
const REVERTED: &str = "execution reverted";

/// Replays the steps of a [`FullTrace`] into a [`Tracer`].
///
/// Frame boundaries are derived from depth changes between consecutive steps. Calls that
/// return without a depth change (precompiles and accounts without code) are reported as an
/// immediate enter/exit pair.
#[derive(Debug, Clone, Copy)]
pub struct TraceReplayer<'a> {
    env: ReplayEnv<'a>,
    trace: &'a FullTrace,
    error: Option<&'a str>,
}

impl<'a> TraceReplayer<'a> {
    /// Creates a replayer for `trace`, which ended with `error` if it failed.
    pub const fn new(env: ReplayEnv<'a>, trace: &'a FullTrace, error: Option<&'a str>) -> Self {
        Self { env, trace, error }
    }

    /// Replays the trace into `tracer` and returns its result.
    pub fn run(&self, tracer: &mut dyn Tracer) -> Result<serde_json::Value, TracerError> {
        let env = &self.env;
        let context = env.context;
        let root = FrameStart {
            kind: match context.kind {
                CallKind::Create => FrameKind::Create,
                CallKind::Call => FrameKind::Call,
            },
            from: context.from,
            to: context.to.unwrap_or_default(),
            input: context.input.clone(),
            gas: context.gas,
            value: context.value,
        };
        tracer.capture_start(env, &root)?;

        // Gas available to each open nested frame.
        let mut open: Vec<u64> = Vec::new();
        let steps = &self.trace.steps;
        for (index, step) in steps.iter().enumerate() {
            if let Some(prev) = index.checked_sub(1).map(|prev| &steps[prev]) {
                self.transition(tracer, &mut open, prev, Some(step))?;
            }
            tracer.capture_state(env, step)?;
            if let Some(error) = &step.error {
                tracer.capture_fault(env, step, error)?;
            }
        }
        if let Some(last) = steps.last() {
            self.transition(tracer, &mut open, last, None)?;
        }

        trace!(target: "tracer", steps = steps.len(), "Replayed recorded execution");
        let end = FrameEnd {
            output: context.output.clone(),
            gas_used: context.gas_used,
            error: self.error.map(str::to_string),
        };
        tracer.capture_end(env, &end)?;
        tracer.result(env)
    }

    /// Reports the frame events between `prev` and `next`. `next` is `None` past the last step.
    fn transition(
        &self,
        tracer: &mut dyn Tracer,
        open: &mut Vec<u64>,
        prev: &Step,
        next: Option<&Step>,
    ) -> Result<(), TracerError> {
        let env = &self.env;
        let return_data = next.map(|step| step.return_data.clone()).unwrap_or_default();

        if prev.op == opcode::SELFDESTRUCT && prev.error.is_none() {
            let frame = FrameStart {
                kind: FrameKind::SelfDestruct,
                from: prev.contract.address,
                to: stack_peek(prev, 0).map(word_to_address).unwrap_or_default(),
                input: Bytes::new(),
                gas: 0,
                value: U256::ZERO,
            };
            tracer.capture_enter(env, &frame)?;
            tracer.capture_exit(env, &FrameEnd::default())?;
        }

        let next_depth = next.map_or(1, |step| step.depth);
        if next_depth > prev.depth {
            if let Some(next) = next {
                let kind = FrameKind::from_opcode(prev.op).unwrap_or(FrameKind::Call);
                let frame = FrameStart {
                    kind,
                    from: next.contract.caller,
                    to: next.contract.address,
                    input: next.contract.input.clone(),
                    gas: next.contract.gas,
                    value: next.contract.value,
                };
                tracer.capture_enter(env, &frame)?;
                open.push(next.contract.gas);
            }
        } else if next_depth < prev.depth {
            let gas_left = prev.gas.saturating_sub(prev.gas_cost);
            let mut error = prev
                .error
                .clone()
                .or_else(|| (prev.op == opcode::REVERT).then(|| REVERTED.to_string()));
            for _ in next_depth..prev.depth {
                let Some(entry_gas) = open.pop() else { break };
                let end = FrameEnd {
                    output: return_data.clone(),
                    gas_used: entry_gas.saturating_sub(gas_left),
                    error: error.take(),
                };
                tracer.capture_exit(env, &end)?;
            }
        } else if let Some(kind) = FrameKind::from_opcode(prev.op).filter(FrameKind::is_call) {
            if prev.error.is_none() && next.is_some() {
                tracer.capture_enter(env, &codeless_call(kind, prev))?;
                tracer.capture_exit(
                    env,
                    &FrameEnd { output: return_data, gas_used: 0, error: None },
                )?;
            }
        }
        Ok(())
    }
}

/// Rebuilds a call frame from the operands of the calling step.
fn codeless_call(kind: FrameKind, step: &Step) -> FrameStart {
    let (value, args) = match kind {
        FrameKind::Call | FrameKind::CallCode => (stack_peek(step, 2).unwrap_or_default(), 3),
        _ => (U256::ZERO, 2),
    };
    let input = match (stack_peek(step, args), stack_peek(step, args + 1)) {
        (Some(offset), Some(length)) => memory_slice(step, offset, length),
        _ => Bytes::new(),
    };
    FrameStart {
        kind,
        from: step.contract.address,
        to: stack_peek(step, 1).map(word_to_address).unwrap_or_default(),
        input,
        gas: stack_peek(step, 0).map(|gas| gas.saturating_to::<u64>()).unwrap_or_default(),
        value,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{InMemoryStateView, PinnedState};
    use alloy_primitives::{Address, B256};
    use zkr_executor::{InstrumentationContext, StepContract};

    /// Builds a step executing `op` at `depth` inside `address`.
    pub(crate) fn step(depth: u64, op: u8, address: Address) -> Step {
        Step {
            depth,
            op,
            gas: 100_000 - depth * 1_000,
            gas_cost: 3,
            contract: StepContract {
                address,
                caller: Address::with_last_byte(0xca),
                gas: 50_000,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Tracer for Recorder {
        fn capture_start(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
            self.events.push(format!("start {}", frame.kind.as_str()));
            Ok(())
        }

        fn capture_state(&mut self, _: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
            self.events.push(format!("step {:#04x}@{}", step.op, step.depth));
            Ok(())
        }

        fn capture_fault(&mut self, _: &ReplayEnv<'_>, _: &Step, error: &str) -> Result<(), TracerError> {
            self.events.push(format!("fault {error}"));
            Ok(())
        }

        fn capture_enter(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
            self.events.push(format!("enter {} {}", frame.kind.as_str(), frame.to));
            Ok(())
        }

        fn capture_exit(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
            self.events.push(format!("exit {:?}", end.error));
            Ok(())
        }

        fn capture_end(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
            self.events.push(format!("end {:?}", end.error));
            Ok(())
        }

        fn result(&mut self, _: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
            Ok(serde_json::json!(self.events))
        }
    }

    fn replay(steps: Vec<Step>, error: Option<&str>) -> Vec<String> {
        let view = InMemoryStateView::default();
        let context = InstrumentationContext::default();
        let env = ReplayEnv::new(U256::from(1), PinnedState::new(&view, B256::ZERO), &context);
        let trace = FullTrace { context: context.clone(), steps };
        let mut recorder = Recorder::default();
        TraceReplayer::new(env, &trace, error).run(&mut recorder).unwrap();
        recorder.events
    }

    #[test]
    fn test_nested_call_enter_exit() {
        let outer = Address::with_last_byte(0x10);
        let inner = Address::with_last_byte(0x20);
        let events = replay(
            vec![
                step(1, opcode::CALL, outer),
                step(2, opcode::PUSH1, inner),
                step(2, opcode::REVERT, inner),
                step(1, opcode::STOP, outer),
            ],
            None,
        );
        assert_eq!(
            events,
            vec![
                "start CALL".to_string(),
                "step 0xf1@1".to_string(),
                format!("enter CALL {inner}"),
                "step 0x60@2".to_string(),
                "step 0xfd@2".to_string(),
                "exit Some(\"execution reverted\")".to_string(),
                "step 0x00@1".to_string(),
                "end None".to_string(),
            ]
        );
    }

    #[test]
    fn test_codeless_call_is_reported() {
        let caller = Address::with_last_byte(0x10);
        let mut call = step(1, opcode::STATICCALL, caller);
        // argsLength, argsOffset, address, gas (bottom first)
        call.stack = vec![U256::from(4), U256::ZERO, U256::from(2), U256::from(1_000)];
        let events = replay(vec![call, step(1, opcode::POP, caller)], None);
        assert_eq!(events[2], format!("enter STATICCALL {}", Address::with_last_byte(2)));
        assert_eq!(events[3], "exit None");
    }

    #[test]
    fn test_fault_and_unclosed_frames() {
        let outer = Address::with_last_byte(0x10);
        let inner = Address::with_last_byte(0x20);
        let mut failing = step(2, opcode::SSTORE, inner);
        failing.error = Some("out of gas".to_string());
        let events = replay(
            vec![step(1, opcode::CREATE, outer), failing],
            Some("out of gas"),
        );
        assert_eq!(events[2], format!("enter CREATE {inner}"));
        assert_eq!(events[4], "fault out of gas");
        assert_eq!(events[5], "exit Some(\"out of gas\")");
        assert_eq!(events[6], "end Some(\"out of gas\")");
    }
}
