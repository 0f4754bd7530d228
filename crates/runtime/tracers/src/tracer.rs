//! The tracer capability.

use crate::{FrameEnd, FrameStart, PinnedState, TracerError};
use alloy_primitives::U256;
use std::fmt::Debug;
use zkr_executor::{InstrumentationContext, Step};

/// The restricted environment a recorded execution is replayed in.
///
/// It never re-executes anything: the chain parameters are fixed and state reads go to a
/// [`PinnedState`].
#[derive(Debug, Clone, Copy)]
pub struct ReplayEnv<'a> {
    /// Block number reported to tracers.
    pub block_number: u64,
    /// Gas price of the transaction.
    pub gas_price: U256,
    /// State pinned to the root the batch produced.
    pub state: PinnedState<'a>,
    /// Context of the replayed transaction.
    pub context: &'a InstrumentationContext,
}

impl<'a> ReplayEnv<'a> {
    /// Block number every replay runs at.
    pub const REPLAY_BLOCK_NUMBER: u64 = 1;

    /// Creates a new [`ReplayEnv`].
    pub const fn new(
        gas_price: U256,
        state: PinnedState<'a>,
        context: &'a InstrumentationContext,
    ) -> Self {
        Self { block_number: Self::REPLAY_BLOCK_NUMBER, gas_price, state, context }
    }
}

/// Observes a replayed execution and produces a structured trace.
///
/// Callbacks arrive in execution order: `capture_start`, then per step `capture_state` (and
/// `capture_fault` for failing steps) interleaved with `capture_enter` / `capture_exit` for
/// nested frames, then `capture_end`.
pub trait Tracer: Debug {
    /// The top-level frame starts.
    fn capture_start(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        let _ = (env, frame);
        Ok(())
    }

    /// An opcode is about to execute.
    fn capture_state(&mut self, env: &ReplayEnv<'_>, step: &Step) -> Result<(), TracerError> {
        let _ = (env, step);
        Ok(())
    }

    /// An opcode failed.
    fn capture_fault(
        &mut self,
        env: &ReplayEnv<'_>,
        step: &Step,
        error: &str,
    ) -> Result<(), TracerError> {
        let _ = (env, step, error);
        Ok(())
    }

    /// A nested frame is entered.
    fn capture_enter(&mut self, env: &ReplayEnv<'_>, frame: &FrameStart) -> Result<(), TracerError> {
        let _ = (env, frame);
        Ok(())
    }

    /// A nested frame is left.
    fn capture_exit(&mut self, env: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        let _ = (env, end);
        Ok(())
    }

    /// The top-level frame ends.
    fn capture_end(&mut self, env: &ReplayEnv<'_>, end: &FrameEnd) -> Result<(), TracerError> {
        let _ = (env, end);
        Ok(())
    }

    /// Produces the trace.
    fn result(&mut self, env: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError>;
}
