//! Configuration file support for carpus.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/carpus/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub intake: IntakeConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Classification capture policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Refuse to record an entry whose code fails validation
    #[serde(default = "default_block_invalid")]
    pub block_invalid: bool,

    /// Show the live code preview on the review screen
    #[serde(default = "default_review_preview")]
    pub review_preview: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            block_invalid: default_block_invalid(),
            review_preview: default_review_preview(),
        }
    }
}

/// Referral intake configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct IntakeConfig {
    /// Override for the referral file path (defaults to the data dir)
    #[serde(default)]
    pub referral_path: Option<PathBuf>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("carpus")
}

fn default_block_invalid() -> bool {
    true
}

fn default_review_preview() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("carpus").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
