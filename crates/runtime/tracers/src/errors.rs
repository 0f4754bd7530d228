//! Error types for the tracer family.

use thiserror::Error;

/// Failure building or running a tracer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TracerError {
    /// The tracer-specific configuration could not be parsed.
    #[error("invalid tracer config: {0}")]
    InvalidConfig(String),
    /// The script could not be evaluated.
    #[error("failed to evaluate tracer script: {0}")]
    Script(String),
    /// The script does not evaluate to an object.
    #[error("tracer script must evaluate to an object")]
    NotAnObject,
    /// A required script function is missing or not callable.
    #[error("trace object must expose a function {0}()")]
    MissingFunction(&'static str),
    /// A script callback threw.
    #[error("tracer callback {name} failed: {reason}")]
    Callback {
        /// Callback name.
        name: &'static str,
        /// Error raised by the callback.
        reason: String,
    },
    /// The tracer output could not be produced.
    #[error("failed to produce trace result: {0}")]
    Result(String),
    /// Reading state for the trace failed.
    #[error(transparent)]
    State(#[from] StateViewError),
}

/// Failure reading state through a [`StateView`](crate::StateView).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateViewError {
    /// No state is known for the root.
    #[error("unknown state root {0}")]
    UnknownRoot(alloy_primitives::B256),
    /// The backend failed.
    #[error("state backend error: {0}")]
    Backend(String),
}
