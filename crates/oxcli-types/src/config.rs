//! CLI configuration loaded from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CliError, Result};

/// Top-level configuration of a CLI instance.
///
/// Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Base prompt shown at the root context.
    pub prompt: String,
    /// Application name printed before the version on remote connect.
    pub banner: Option<String>,
    /// Application version string.
    pub version: String,
    /// Environment variable naming an alternate grammar document.
    pub grammar_env: String,
    /// TCP port for remote mode. `None` selects local interactive mode.
    pub tcp_port: Option<u16>,
    /// Maximum history entries kept by the line editor.
    pub history_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            prompt: "cli> ".to_string(),
            banner: None,
            version: "1.0.0".to_string(),
            grammar_env: "OXCLI_GRAMMAR".to_string(),
            tcp_port: None,
            history_size: 1000,
        }
    }
}

impl CliConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| CliError::Config(format!("cli config: {e}")))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml(&source)
    }

    /// Remote mode is selected when a TCP port is configured.
    pub fn is_remote(&self) -> bool {
        self.tcp_port.is_some()
    }
}
