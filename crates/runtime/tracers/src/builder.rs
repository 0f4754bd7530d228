//! Tracer construction.

use crate::{
    JsTracer, TraceConfig, Tracer, TracerContext, TracerError, TracerKind,
    config::parse_tracer_config,
    native::{CallTracer, FlatCallTracer, FourByteTracer, NoopTracer, PrestateTracer},
};
use tracing::debug;

/// Builds the replay tracer selected by `config` for one transaction.
///
/// Returns `None` for the struct logger, which reads the executor's trace directly and is never
/// replayed.
pub fn build_tracer(
    config: &TraceConfig,
    context: TracerContext,
) -> Result<Option<Box<dyn Tracer>>, TracerError> {
    let tracer_config = config.tracer_config.as_ref();
    let kind = config.kind();
    let tracer: Box<dyn Tracer> = match &kind {
        TracerKind::StructLog => return Ok(None),
        TracerKind::FourByte => Box::new(FourByteTracer::new()),
        TracerKind::Call => Box::new(CallTracer::new(parse_tracer_config(tracer_config)?)),
        TracerKind::FlatCall => Box::new(
            FlatCallTracer::new(context, parse_tracer_config(tracer_config)?)
                .with_limit(config.limit),
        ),
        TracerKind::Noop => Box::new(NoopTracer),
        TracerKind::Prestate => Box::new(PrestateTracer::new(parse_tracer_config(tracer_config)?)),
        TracerKind::Script(code) => Box::new(JsTracer::new(code, tracer_config, context)?),
    };
    debug!(target: "tracer", tracer = kind.label(), tx_index = context.tx_index, "Built tracer");
    Ok(Some(tracer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(tracer: Option<&str>, tracer_config: Option<serde_json::Value>) -> TraceConfig {
        TraceConfig { tracer: tracer.map(str::to_string), tracer_config, ..Default::default() }
    }

    #[test]
    fn test_struct_logger_is_not_replayed() {
        let tracer = build_tracer(&config(None, None), TracerContext::default()).unwrap();
        assert!(tracer.is_none());
    }

    #[rstest]
    #[case("4byteTracer")]
    #[case("callTracer")]
    #[case("flatCallTracer")]
    #[case("noopTracer")]
    #[case("prestateTracer")]
    #[case("{result: function() { return 1; }, fault: function() {}}")]
    fn test_builds_replay_tracers(#[case] tracer: &str) {
        let tracer = build_tracer(&config(Some(tracer), None), TracerContext::default()).unwrap();
        assert!(tracer.is_some());
    }

    #[test]
    fn test_invalid_tracer_config() {
        let config = config(Some("callTracer"), Some(serde_json::json!({ "onlyTopCall": "yes" })));
        let err = build_tracer(&config, TracerContext::default()).unwrap_err();
        assert!(matches!(err, TracerError::InvalidConfig(_)));
    }

    #[test]
    fn test_broken_script_fails_construction() {
        let err = build_tracer(&config(Some("{step: 1}"), None), TracerContext::default())
            .unwrap_err();
        assert_eq!(err, TracerError::MissingFunction("result"));
    }
}
