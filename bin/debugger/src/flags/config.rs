use anyhow::{Context as _, Result};
use std::path::Path;
use zkr_debug::DebugConfig;

/// Reads the network configuration from `path`.
///
/// Files ending in `.toml` are parsed as TOML, anything else as JSON.
pub async fn load_config(path: &Path) -> Result<DebugConfig> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let config: DebugConfig = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from '{}'", path.display()))?
    };
    if config.fork_intervals.is_empty() {
        anyhow::bail!("'{}' configures no fork intervals", path.display());
    }
    Ok(config)
}
