//! Standard paths used by repoforge tools

use std::path::PathBuf;

/// Standard repoforge paths
pub struct Paths {
    /// Data directory (~/.local/share/repoforge)
    pub data: PathBuf,
    /// Config directory (~/.config/repoforge)
    pub config: PathBuf,
    /// Tools directory (~/.local/bin)
    pub tools: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("repoforge");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("repoforge");

        let tools = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".local/bin");

        Self {
            data,
            config,
            tools,
        }
    }

    /// Config file path
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
