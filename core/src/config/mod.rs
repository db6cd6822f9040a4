//! Configuration management
//!
//! One small TOML file (`taskling.toml`), discovered in the working
//! directory first and the user config directory second. Every field has a
//! default so the assistant runs with no config file and no network.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TasklingError};

/// Remote planning endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Whether the remote planner tier is used at all
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Bounded wait for the planning call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Agent behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Preferred locale tag tried first by the phrase tables
    #[serde(default)]
    pub locale: Option<String>,
    /// Cap on retained conversation turns
    #[serde(default = "default_conversation_cap")]
    pub conversation_cap: usize,
    /// Abort remaining steps after the first failure
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_conversation_cap() -> usize {
    crate::agent::memory::DEFAULT_CONVERSATION_CAP
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            locale: None,
            conversation_cap: default_conversation_cap(),
            fail_fast: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Config {
    /// Load configuration from the first file found, or defaults
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| TasklingError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("taskling.toml");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(dir) = get_config_dir() {
        let path = dir.join("taskling.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    use dirs::config_dir;
    use home::home_dir;

    if let Some(dir) = config_dir() {
        return Some(dir.join("taskling"));
    }

    if let Some(home) = home_dir() {
        return Some(home.join(".config").join("taskling"));
    }

    None
}
