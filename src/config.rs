//! Update provider configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Configuration for one update provider.
///
/// The target version is immutable for the provider's lifetime; moving an
/// instance to a different target means constructing a new provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    /// Version identifier this provider deploys.
    pub target_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateToml {
    update: UpdateConfig,
}

impl UpdateConfig {
    pub fn new(target_version: impl Into<String>) -> Self {
        Self {
            target_version: target_version.into(),
        }
    }

    /// Load from a TOML file with an `[update]` table.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading update config '{}'", path.display()))?;
        let parsed: UpdateToml = toml::from_str(&raw)
            .with_context(|| format!("parsing update config '{}'", path.display()))?;

        let config = parsed.update;
        if config.target_version.trim().is_empty() {
            bail!(
                "invalid update config '{}': target_version must not be empty",
                path.display()
            );
        }
        Ok(config)
    }
}
