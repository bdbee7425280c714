//! Configuration management.

use anyhow::{Context, Result};
use rgb_panel_hw::DEFAULT_ADDRESS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// I2C character device (e.g., "/dev/i2c-1")
    #[serde(default = "default_device")]
    pub device: String,

    /// Panel addresses, flushed in order
    #[serde(default = "default_addresses")]
    pub addresses: Vec<u8>,
}

fn default_device() -> String {
    "/dev/i2c-1".to_string()
}

fn default_addresses() -> Vec<u8> {
    vec![DEFAULT_ADDRESS]
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: default_device(),
            addresses: default_addresses(),
        }
    }
}
