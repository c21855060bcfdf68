//! Configuration management for repoforge tools

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global repoforge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL for the GitHub API (set for GitHub Enterprise)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Organization used when no --org flag is given
    #[serde(default)]
    pub default_org: Option<String>,
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
