//! User supplied JavaScript tracers.

use crate::{
    FrameEnd, FrameStart, ReplayEnv, Tracer, TracerContext, TracerError, opcode_name,
    utils::{stack_peek, word_to_address, word_to_slot},
};
use alloy_primitives::{Address, B256};
use boa_engine::{Context, JsObject, JsString, JsValue, Source};
use revm::bytecode::opcode;
use serde_json::{Value, json};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};
use tracing::debug;
use zkr_executor::Step;

/// Wraps the raw JSON handed over from Rust into the objects tracer scripts work with.
///
/// The `db` object only knows the accounts and slots the replay touched so far, read at the
/// state root the replay is pinned to.
const PRELUDE: &str = r#"
(function () {
    var ZERO_WORD = "0x0000000000000000000000000000000000000000000000000000000000000000";
    var accounts = {};
    function key(value) { return String(value).toLowerCase(); }
    function word(value) {
        var hex = key(value);
        if (hex.indexOf("0x") === 0) { hex = hex.slice(2); }
        while (hex.length < 64) { hex = "0" + hex; }
        return "0x" + hex;
    }
    function account(address) { return accounts[key(address)]; }
    var db = {
        getBalance: function (address) { var a = account(address); return a ? a.balance : "0x0"; },
        getNonce: function (address) { var a = account(address); return a ? a.nonce : 0; },
        getCode: function (address) { var a = account(address); return a ? a.code : "0x"; },
        getState: function (address, slot) {
            var a = account(address);
            return (a && a.storage[word(slot)]) || ZERO_WORD;
        },
        exists: function (address) { return account(address) !== undefined; }
    };
    return {
        db: function () { return db; },
        remember: function (address, state) {
            if (state === null || accounts[key(address)] !== undefined) { return; }
            accounts[key(address)] = {
                balance: state.balance, nonce: state.nonce, code: state.code, storage: {}
            };
        },
        rememberSlot: function (address, slot, value) {
            var a = account(address);
            if (a === undefined) {
                a = accounts[key(address)] = { balance: "0x0", nonce: 0, code: "0x", storage: {} };
            }
            a.storage[word(slot)] = value;
        },
        log: function (raw) {
            return {
                op: {
                    toNumber: function () { return raw.op; },
                    toString: function () { return raw.opName; },
                    isPush: function () { return raw.op >= 0x5f && raw.op <= 0x7f; }
                },
                stack: {
                    length: function () { return raw.stack.length; },
                    peek: function (i) { return raw.stack[raw.stack.length - 1 - i]; }
                },
                memory: {
                    length: function () { return raw.memory.length; },
                    slice: function (start, end) { return raw.memory.slice(start, end); },
                    getUint: function (offset) { return raw.memory.slice(offset, offset + 32); }
                },
                contract: {
                    getAddress: function () { return raw.contract.address; },
                    getCaller: function () { return raw.contract.caller; },
                    getValue: function () { return raw.contract.value; },
                    getInput: function () { return raw.contract.input; }
                },
                getPC: function () { return raw.pc; },
                getGas: function () { return raw.gas; },
                getCost: function () { return raw.cost; },
                getDepth: function () { return raw.depth; },
                getRefund: function () { return raw.refund; },
                getError: function () { return raw.error === null ? undefined : raw.error; }
            };
        },
        frame: function (raw) {
            return {
                getType: function () { return raw.type; },
                getFrom: function () { return raw.from; },
                getTo: function () { return raw.to; },
                getInput: function () { return raw.input; },
                getGas: function () { return raw.gas; },
                getValue: function () { return raw.value; }
            };
        },
        frameResult: function (raw) {
            return {
                getGasUsed: function () { return raw.gasUsed; },
                getOutput: function () { return raw.output; },
                getError: function () { return raw.error === null ? undefined : raw.error; }
            };
        }
    };
})()
"#;

/// Tracer delegating every callback to a script.
///
/// The script must evaluate to an object exposing `result(ctx, db)` and `fault(log, db)`. It
/// may also expose `setup(config)`, `step(log, db)`, `enter(frame)` and `exit(frameResult)`.
pub struct JsTracer {
    ctx: Context,
    obj: JsObject,
    helpers: JsObject,
    db: JsValue,
    result_fn: JsObject,
    fault_fn: JsObject,
    step_fn: Option<JsObject>,
    enter_fn: Option<JsObject>,
    exit_fn: Option<JsObject>,
    context: TracerContext,
    error: Option<String>,
    known: BTreeMap<Address, BTreeSet<B256>>,
}

impl fmt::Debug for JsTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsTracer")
            .field("context", &self.context)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl JsTracer {
    /// Evaluates `code` and runs its `setup` function with `config`.
    pub fn new(
        code: &str,
        config: Option<&Value>,
        context: TracerContext,
    ) -> Result<Self, TracerError> {
        let mut ctx = Context::default();
        let helpers = ctx
            .eval(Source::from_bytes(PRELUDE))
            .map_err(|err| TracerError::Script(err.to_string()))?
            .as_object()
            .cloned()
            .ok_or(TracerError::NotAnObject)?;

        let code = format!("({code})");
        let obj = ctx
            .eval(Source::from_bytes(code.as_bytes()))
            .map_err(|err| TracerError::Script(err.to_string()))?
            .as_object()
            .cloned()
            .ok_or(TracerError::NotAnObject)?;

        let result_fn =
            function(&obj, "result", &mut ctx)?.ok_or(TracerError::MissingFunction("result"))?;
        let fault_fn =
            function(&obj, "fault", &mut ctx)?.ok_or(TracerError::MissingFunction("fault"))?;
        let step_fn = function(&obj, "step", &mut ctx)?;
        let enter_fn = function(&obj, "enter", &mut ctx)?;
        let exit_fn = function(&obj, "exit", &mut ctx)?;

        if let Some(setup_fn) = function(&obj, "setup", &mut ctx)? {
            let config = match config {
                Some(config) => JsValue::from_json(config, &mut ctx)
                    .map_err(|err| TracerError::InvalidConfig(err.to_string()))?,
                None => JsValue::undefined(),
            };
            setup_fn
                .call(&obj.clone().into(), &[config], &mut ctx)
                .map_err(|err| TracerError::Callback { name: "setup", reason: err.to_string() })?;
        }

        let db_fn = function(&helpers, "db", &mut ctx)?.ok_or(TracerError::MissingFunction("db"))?;
        let db = db_fn
            .call(&JsValue::undefined(), &[], &mut ctx)
            .map_err(|err| TracerError::Script(err.to_string()))?;

        debug!(target: "tracer", tx_hash = %context.tx_hash, "Compiled script tracer");
        Ok(Self {
            ctx,
            obj,
            helpers,
            db,
            result_fn,
            fault_fn,
            step_fn,
            enter_fn,
            exit_fn,
            context,
            error: None,
            known: BTreeMap::new(),
        })
    }

    /// Calls a prelude helper with JSON arguments.
    fn helper(&mut self, name: &'static str, args: &[Value]) -> Result<JsValue, TracerError> {
        let helper =
            function(&self.helpers, name, &mut self.ctx)?.ok_or(TracerError::MissingFunction(name))?;
        let args = args
            .iter()
            .map(|arg| JsValue::from_json(arg, &mut self.ctx))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| TracerError::Callback { name, reason: err.to_string() })?;
        helper
            .call(&JsValue::undefined(), &args, &mut self.ctx)
            .map_err(|err| TracerError::Callback { name, reason: err.to_string() })
    }

    /// Calls a script callback with `this` bound to the tracer object.
    fn callback(
        &mut self,
        name: &'static str,
        function: &JsObject,
        args: &[JsValue],
    ) -> Result<JsValue, TracerError> {
        function
            .call(&self.obj.clone().into(), args, &mut self.ctx)
            .map_err(|err| TracerError::Callback { name, reason: err.to_string() })
    }

    fn remember_account(&mut self, env: &ReplayEnv<'_>, address: Address) -> Result<(), TracerError> {
        if self.known.contains_key(&address) {
            return Ok(());
        }
        self.known.insert(address, BTreeSet::new());
        let state = env.state.account(address)?.map(|account| {
            json!({ "balance": account.balance, "nonce": account.nonce, "code": account.code })
        });
        self.helper("remember", &[json!(address), state.unwrap_or(Value::Null)])?;
        Ok(())
    }

    fn remember_slot(
        &mut self,
        env: &ReplayEnv<'_>,
        address: Address,
        slot: B256,
    ) -> Result<(), TracerError> {
        if self.known.get(&address).is_some_and(|slots| slots.contains(&slot)) {
            return Ok(());
        }
        self.remember_account(env, address)?;
        self.known.entry(address).or_default().insert(slot);
        let value = env.state.storage(address, slot)?;
        self.helper("rememberSlot", &[json!(address), json!(slot), json!(value)])?;
        Ok(())
    }

    /// Records the state the step is about to read.
    fn remember_step(&mut self, env: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        match step.op {
            opcode::SLOAD | opcode::SSTORE => {
                if let Some(slot) = stack_peek(step, 0) {
                    self.remember_slot(env, step.contract.address, word_to_slot(slot))?;
                }
            }
            opcode::BALANCE | opcode::EXTCODESIZE | opcode::EXTCODEHASH | opcode::EXTCODECOPY => {
                if let Some(address) = stack_peek(step, 0) {
                    self.remember_account(env, word_to_address(address))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn log(&mut self, step: &Step, error: Option<&str>) -> Result<JsValue, TracerError> {
        let raw = json!({
            "op": step.op,
            "opName": opcode_name(step.op),
            "pc": step.pc,
            "gas": step.gas,
            "cost": step.gas_cost,
            "depth": step.depth,
            "refund": step.refund,
            "error": error,
            "stack": step.stack,
            "memory": step.memory.to_vec(),
            "contract": {
                "address": step.contract.address,
                "caller": step.contract.caller,
                "value": step.contract.value,
                "input": step.contract.input,
            },
        });
        self.helper("log", &[raw])
    }
}

impl Tracer for JsTracer {
    fn capture_start(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.remember_account(env, frame.from)?;
        self.remember_account(env, frame.to)
    }

    fn capture_state(&mut self, env: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        let Some(step_fn) = self.step_fn.clone() else { return Ok(()) };
        if step.error.is_some() {
            return Ok(());
        }
        self.remember_step(env, step)?;
        let log = self.log(step, None)?;
        let db = self.db.clone();
        self.callback("step", &step_fn, &[log, db])?;
        Ok(())
    }

    fn capture_fault(&mut self, _: &ReplayEnv<'_>, step: &Step, error: &str) -> Result<(), TracerError> {
        let fault_fn = self.fault_fn.clone();
        let log = self.log(step, Some(error))?;
        let db = self.db.clone();
        self.callback("fault", &fault_fn, &[log, db])?;
        Ok(())
    }

    fn capture_enter(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.remember_account(env, frame.to)?;
        let Some(enter_fn) = self.enter_fn.clone() else { return Ok(()) };
        let raw = json!({
            "type": frame.kind.as_str(),
            "from": frame.from,
            "to": frame.to,
            "input": frame.input,
            "gas": frame.gas,
            "value": frame.value,
        });
        let frame = self.helper("frame", &[raw])?;
        self.callback("enter", &enter_fn, &[frame])?;
        Ok(())
    }

    fn capture_exit(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        let Some(exit_fn) = self.exit_fn.clone() else { return Ok(()) };
        let raw = json!({ "gasUsed": end.gas_used, "output": end.output, "error": end.error });
        let result = self.helper("frameResult", &[raw])?;
        self.callback("exit", &exit_fn, &[result])?;
        Ok(())
    }

    fn capture_end(&mut self, _: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        self.error = end.error.clone();
        Ok(())
    }

    fn result(&mut self, env: &ReplayEnv<'_>) -> Result<Value, TracerError> {
        let context = env.context;
        let mut raw = json!({
            "type": context.kind.to_string(),
            "from": context.from,
            "to": context.to,
            "input": context.input,
            "gas": context.gas,
            "gasUsed": context.gas_used,
            "gasPrice": env.gas_price,
            "value": context.value,
            "block": env.block_number,
            "output": context.output,
            "time": format!("{:?}", context.time),
            "blockHash": self.context.block_hash,
            "txIndex": self.context.tx_index,
            "txHash": self.context.tx_hash,
        });
        if let Some(error) = &self.error {
            raw["error"] = json!(error);
        }
        let ctx = JsValue::from_json(&raw, &mut self.ctx)
            .map_err(|err| TracerError::Result(err.to_string()))?;
        let result_fn = self.result_fn.clone();
        let db = self.db.clone();
        let result = self.callback("result", &result_fn, &[ctx, db])?;
        result.to_json(&mut self.ctx).map_err(|err| TracerError::Result(err.to_string()))
    }
}

/// Returns the callable property `name` of `obj`, if present.
fn function(
    obj: &JsObject,
    name: &'static str,
    ctx: &mut Context,
) -> Result<Option<JsObject>, TracerError> {
    let value =
        obj.get(JsString::from(name), ctx).map_err(|err| TracerError::Script(err.to_string()))?;
    Ok(value.as_object().filter(|function| function.is_callable()).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AccountState, InMemoryAccount, InMemoryStateView, PinnedState, TraceReplayer,
        replay::tests::step,
    };
    use alloy_primitives::{Bytes, U256};
    use zkr_executor::{FullTrace, InstrumentationContext};

    const ROOT: B256 = B256::repeat_byte(0x02);

    fn run(code: &str, config: Option<&Value>, steps: Vec<Step>) -> Result<Value, TracerError> {
        let mut view = InMemoryStateView::default();
        view.insert(
            ROOT,
            Address::with_last_byte(0x10),
            InMemoryAccount {
                state: AccountState { balance: U256::from(42), nonce: 1, code: Bytes::new() },
                storage: BTreeMap::from([(B256::with_last_byte(1), B256::with_last_byte(7))]),
            },
        );
        let context = InstrumentationContext {
            from: Address::with_last_byte(0xaa),
            to: Some(Address::with_last_byte(0x10)),
            gas_used: 21_000,
            ..Default::default()
        };
        let env = ReplayEnv::new(U256::from(1), PinnedState::new(&view, ROOT), &context);
        let trace = FullTrace { context: context.clone(), steps };
        let tracer_context = TracerContext { block_number: 5, ..Default::default() };
        let mut tracer = JsTracer::new(code, config, tracer_context)?;
        TraceReplayer::new(env, &trace, None).run(&mut tracer)
    }

    fn steps() -> Vec<Step> {
        let contract = Address::with_last_byte(0x10);
        let mut sload = step(1, opcode::SLOAD, contract);
        sload.stack = vec![U256::from(1)];
        vec![step(1, opcode::PUSH1, contract), sload, step(1, opcode::STOP, contract)]
    }

    #[test]
    fn test_script_counts_steps() {
        let code = r#"{
            ops: [],
            step: function(log, db) { this.ops.push(log.op.toString()); },
            fault: function(log, db) {},
            result: function(ctx, db) { return { ops: this.ops, gasUsed: ctx.gasUsed, type: ctx.type }; }
        }"#;
        let result = run(code, None, steps()).unwrap();
        assert_eq!(result["ops"], json!(["PUSH1", "SLOAD", "STOP"]));
        assert_eq!(result["gasUsed"].as_f64(), Some(21_000.0));
        assert_eq!(result["type"], "CALL");
    }

    #[test]
    fn test_script_reads_db() {
        let code = r#"{
            slot: null,
            step: function(log, db) {
                if (log.op.toString() == "SLOAD") {
                    this.slot = db.getState(log.contract.getAddress(), log.stack.peek(0));
                }
            },
            fault: function() {},
            result: function(ctx, db) { return { balance: db.getBalance(ctx.to), slot: this.slot }; }
        }"#;
        let result = run(code, None, steps()).unwrap();
        assert_eq!(result["balance"], "0x2a");
        assert_eq!(result["slot"], json!(B256::with_last_byte(7)));
    }

    #[test]
    fn test_script_setup_receives_config() {
        let code = r#"{
            setup: function(config) { this.label = config.label; },
            fault: function() {},
            result: function() { return this.label; }
        }"#;
        let config = json!({ "label": "zkr" });
        assert_eq!(run(code, Some(&config), steps()).unwrap(), json!("zkr"));
    }

    #[test]
    fn test_script_construction_errors() {
        let err = run("{ fault: function() {} }", None, Vec::new()).unwrap_err();
        assert_eq!(err, TracerError::MissingFunction("result"));

        let err = run("{ result: function() {} }", None, Vec::new()).unwrap_err();
        assert_eq!(err, TracerError::MissingFunction("fault"));

        let err = run("1", None, Vec::new()).unwrap_err();
        assert_eq!(err, TracerError::NotAnObject);

        let err = run("{ result: ", None, Vec::new()).unwrap_err();
        assert!(matches!(err, TracerError::Script(_)));
    }

    #[test]
    fn test_script_callback_error() {
        let code = r#"{
            step: function() { throw new Error("boom"); },
            fault: function() {},
            result: function() { return {}; }
        }"#;
        let err = run(code, None, steps()).unwrap_err();
        assert!(matches!(err, TracerError::Callback { name: "step", .. }));
    }
}
