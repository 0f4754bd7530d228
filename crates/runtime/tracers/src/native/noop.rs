//! Tracer producing an empty result.

use crate::{ReplayEnv, Tracer, TracerError};

/// Ignores every event and returns `{}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn result(&mut self, _: &ReplayEnv<'_>) -> Result<serde_json::Value, TracerError> {
        Ok(serde_json::Value::Object(Default::default()))
    }
}
