//! Pre-state tracer.

use crate::{
    AccountState, FrameStart, PinnedState, ReplayEnv, Tracer, TracerError,
    utils::{stack_peek, word_to_address, word_to_slot},
};
use alloy_primitives::{Address, B256, Bytes, U256};
use revm::bytecode::opcode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use zkr_executor::Step;

/// Prestate tracer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrestateTracerConfig {
    /// Return the changes made by the transaction as `{pre, post}`.
    pub diff_mode: bool,
    /// Omit contract code.
    pub disable_code: bool,
    /// Omit storage.
    pub disable_storage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrestateAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<Bytes>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    storage: BTreeMap<B256, B256>,
}

#[derive(Debug, Serialize)]
struct PrestateDiff {
    pre: BTreeMap<Address, PrestateAccount>,
    post: BTreeMap<Address, PrestateAccount>,
}

/// Reports the accounts and storage slots a transaction touched, as they were before it ran.
///
/// Pre-state is read at the state root the batch started from; in diff mode the post-state
/// is read at the root the replay is pinned to.
#[derive(Debug, Clone, Default)]
pub struct PrestateTracer {
    config: PrestateTracerConfig,
    touched: BTreeMap<Address, BTreeSet<B256>>,
}

impl PrestateTracer {
    /// Creates a new [`PrestateTracer`].
    pub const fn new(config: PrestateTracerConfig) -> Self {
        Self { config, touched: BTreeMap::new() }
    }

    fn touch(&mut self, address: Address) {
        self.touched.entry(address).or_default();
    }

    fn touch_slot(&mut self, address: Address, slot: B256) {
        self.touched.entry(address).or_default().insert(slot);
    }

    /// Reads `address` and its touched `slots` at `state`, honouring the configured omissions.
    fn lookup(
        &self,
        state: &PinnedState<'_>,
        address: Address,
        slots: &BTreeSet<B256>,
    ) -> Result<Option<PrestateAccount>, TracerError> {
        let Some(AccountState { balance, nonce, code }) = state.account(address)? else {
            return Ok(None);
        };
        let mut account = PrestateAccount {
            balance: Some(balance),
            nonce: (nonce > 0).then_some(nonce),
            code: (!self.config.disable_code && !code.is_empty()).then_some(code),
            storage: BTreeMap::new(),
        };
        if !self.config.disable_storage {
            for slot in slots {
                account.storage.insert(*slot, state.storage(address, *slot)?);
            }
        }
        Ok(Some(account))
    }

    fn prestate(&self, pre_state: &PinnedState<'_>) -> Result<serde_json::Value, TracerError> {
        let mut pre = BTreeMap::new();
        for (address, slots) in &self.touched {
            if let Some(account) = self.lookup(pre_state, *address, slots)? {
                pre.insert(*address, account);
            }
        }
        serde_json::to_value(pre).map_err(|err| TracerError::Result(err.to_string()))
    }

    fn diff(
        &self,
        pre_state: &PinnedState<'_>,
        post_state: &PinnedState<'_>,
    ) -> Result<serde_json::Value, TracerError> {
        let mut diff = PrestateDiff { pre: BTreeMap::new(), post: BTreeMap::new() };
        for (address, slots) in &self.touched {
            let before = self.lookup(pre_state, *address, slots)?;
            let after = self.lookup(post_state, *address, slots)?;
            if before == after {
                continue;
            }
            match (before, after) {
                (Some(mut before), Some(mut after)) => {
                    before.storage.retain(|slot, value| after.storage.get(slot) != Some(&*value));
                    after.storage.retain(|slot, value| {
                        !value.is_zero() && before.storage.get(slot).is_some_and(|old| *old != *value)
                    });
                    // Only changed fields are reported in the post-state.
                    if after.balance == before.balance {
                        after.balance = None;
                    }
                    if after.nonce == before.nonce {
                        after.nonce = None;
                    }
                    if after.code == before.code {
                        after.code = None;
                    }
                    diff.pre.insert(*address, before);
                    diff.post.insert(*address, after);
                }
                (Some(before), None) => {
                    diff.pre.insert(*address, before);
                }
                (None, Some(mut after)) => {
                    after.storage.retain(|_, value| !value.is_zero());
                    diff.post.insert(*address, after);
                }
                (None, None) => {}
            }
        }
        serde_json::to_value(diff).map_err(|err| TracerError::Result(err.to_string()))
    }
}

impl Tracer for PrestateTracer {
    fn capture_start(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.touch(frame.from);
        self.touch(frame.to);
        Ok(())
    }

    fn capture_state(&mut self, _: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        if step.error.is_some() {
            return Ok(());
        }
        match step.op {
            opcode::SLOAD | opcode::SSTORE => {
                if let Some(slot) = stack_peek(step, 0) {
                    self.touch_slot(step.contract.address, word_to_slot(slot));
                }
            }
            opcode::BALANCE |
            opcode::EXTCODESIZE |
            opcode::EXTCODEHASH |
            opcode::EXTCODECOPY |
            opcode::SELFDESTRUCT => {
                if let Some(address) = stack_peek(step, 0) {
                    self.touch(word_to_address(address));
                }
            }
            opcode::CALL | opcode::CALLCODE | opcode::DELEGATECALL | opcode::STATICCALL => {
                if let Some(address) = stack_peek(step, 1) {
                    self.touch(word_to_address(address));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn capture_enter(&mut self, _: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        self.touch(frame.to);
        Ok(())
    }

    fn result(&mut self, env: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
        let pre_state = env.state.at(env.context.old_state_root);
        if self.config.diff_mode {
            self.diff(&pre_state, &env.state)
        } else {
            self.prestate(&pre_state)
        }
    }
}
