use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use zkr_tracers::TraceConfig;

/// Tracer selection and capture toggles.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceArgs {
    /// Built-in tracer name or inline script. The struct logger is used when unset.
    #[arg(long, conflicts_with = "tracer_file")]
    pub tracer: Option<String>,

    /// Path to a script tracer.
    #[arg(long = "tracer-file")]
    pub tracer_file: Option<PathBuf>,

    /// Tracer configuration, as JSON.
    #[arg(long = "tracer-config")]
    pub tracer_config: Option<String>,

    /// Skip storage in struct logs.
    #[arg(long = "disable-storage")]
    pub disable_storage: bool,

    /// Skip the stack in struct logs.
    #[arg(long = "disable-stack")]
    pub disable_stack: bool,

    /// Include memory in struct logs.
    #[arg(long = "enable-memory")]
    pub enable_memory: bool,

    /// Include return data in struct logs.
    #[arg(long = "enable-return-data")]
    pub enable_return_data: bool,

    /// Maximum number of entries returned by the flat call tracer.
    #[arg(long)]
    pub limit: Option<u64>,
}

impl TraceArgs {
    /// Builds the [`TraceConfig`] of the request.
    pub async fn trace_config(&self) -> Result<TraceConfig> {
        let tracer = match &self.tracer_file {
            Some(path) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read '{}'", path.display()))?,
            ),
            None => self.tracer.clone(),
        };
        let tracer_config: Option<serde_json::Value> = self
            .tracer_config
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Failed to parse tracer config")?;

        Ok(TraceConfig {
            tracer,
            tracer_config,
            disable_storage: self.disable_storage,
            disable_stack: self.disable_stack,
            enable_memory: self.enable_memory,
            enable_return_data: self.enable_return_data,
            limit: self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        trace: TraceArgs,
    }

    fn parse(args: &[&str]) -> TraceArgs {
        TestCli::parse_from(std::iter::once("test").chain(args.iter().copied())).trace
    }

    #[tokio::test]
    async fn test_default_is_struct_logger() {
        let config = parse(&[]).trace_config().await.unwrap();
        assert_eq!(config, TraceConfig::default());
        assert!(config.is_default_tracer());
    }

    #[rstest]
    #[case::call(&["--tracer", "callTracer"], "callTracer")]
    #[case::flat(&["--tracer", "flatCallTracer", "--limit", "2"], "flatCallTracer")]
    #[tokio::test]
    async fn test_named_tracer(#[case] args: &[&str], #[case] expected: &str) {
        let config = parse(args).trace_config().await.unwrap();
        assert_eq!(config.tracer.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn test_tracer_config_and_toggles() {
        let args = parse(&[
            "--tracer",
            "callTracer",
            "--tracer-config",
            r#"{"onlyTopCall":true}"#,
            "--disable-stack",
            "--enable-memory",
        ]);
        let config = args.trace_config().await.unwrap();
        assert_eq!(config.tracer_config, Some(json!({ "onlyTopCall": true })));
        assert!(config.disable_stack);
        assert!(config.enable_memory);
        assert!(!config.disable_storage);
    }

    #[tokio::test]
    async fn test_invalid_tracer_config() {
        let args = parse(&["--tracer-config", "{"]);
        assert!(args.trace_config().await.is_err());
    }

    #[tokio::test]
    async fn test_tracer_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ result: function() { return 1; }, fault: function() {} }")
            .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = parse(&["--tracer-file", &path]).trace_config().await.unwrap();
        assert!(config.tracer.unwrap().starts_with("{ result"));
    }
}
