//! Helpers shared by several commands.

use std::path::Path;

use anyhow::Context;
use polykey_config::EngineConfig;

/// Loads the configuration at `path`, or the factory configuration.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)
                .with_context(|| format!("loading config '{}'", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}
