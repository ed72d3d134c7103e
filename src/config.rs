//! Configuration loading and management
//!
//! Handles parsing of `verdiff.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::BotIdentity;

/// Name of the configuration file searched for in the current directory.
pub const CONFIG_FILE: &str = "verdiff.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for scratch work repositories
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,

    /// Default origin URL used by `init` when `--origin` is not given.
    /// May embed a short-lived credential; treated as opaque.
    #[serde(default)]
    pub remote: Option<String>,

    /// Committer identity used in scratch repositories
    #[serde(default)]
    pub bot: BotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_root: default_scratch_root(),
            remote: None,
            bot: BotConfig::default(),
        }
    }
}

fn default_scratch_root() -> PathBuf {
    directories::ProjectDirs::from("", "", "verdiff")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".verdiff"))
}

/// Bot identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Committer name
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Committer email
    #[serde(default = "default_bot_email")]
    pub email: String,
}

fn default_bot_name() -> String {
    "verdiff".to_string()
}

fn default_bot_email() -> String {
    "verdiff@localhost".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            email: default_bot_email(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly named config file, or `verdiff.toml` from the
    /// current directory when present, or defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if local.exists() {
                    Self::load(&local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The committer identity the store configures in scratch repos.
    pub fn bot_identity(&self) -> BotIdentity {
        BotIdentity {
            name: self.bot.name.clone(),
            email: self.bot.email.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.bot.name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "bot.name cannot be empty".to_string(),
            ));
        }
        let email = self.bot.email.trim();
        if email.is_empty() {
            return Err(Error::InvalidConfig(
                "bot.email cannot be empty".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(Error::InvalidConfig(format!(
                "bot.email '{email}' is not an address"
            )));
        }
        if let Some(remote) = &self.remote {
            if remote.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "remote cannot be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}
