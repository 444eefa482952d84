use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::platform::CapabilityLevel;

const DEFAULT_OUTCOME_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCAN_SETTLE_MS: u64 = 500;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub default_interface: Option<String>,
    /// Forces the legacy or modern connection path.
    #[serde(default)]
    pub connect_mode: Option<CapabilityLevel>,
    #[serde(default)]
    pub outcome_timeout_secs: Option<u64>,
    #[serde(default)]
    pub scan_settle_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NetworkConfig {
    pub ssid: String,
    pub password: String,
    #[serde(default)]
    pub interface: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn find_network(&self, ssid: &str) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.ssid == ssid)
    }

    pub fn add_network(&mut self, network: NetworkConfig) {
        // Replace any entry for the same SSID
        self.networks.retain(|n| n.ssid != network.ssid);
        self.networks.push(network);
    }

    /// Returns true if an entry was removed.
    pub fn remove_network(&mut self, ssid: &str) -> bool {
        let before = self.networks.len();
        self.networks.retain(|n| n.ssid != ssid);
        self.networks.len() != before
    }

    pub fn outcome_timeout(&self) -> Duration {
        Duration::from_secs(self.outcome_timeout_secs.unwrap_or(DEFAULT_OUTCOME_TIMEOUT_SECS))
    }

    pub fn scan_settle(&self) -> Duration {
        Duration::from_millis(self.scan_settle_ms.unwrap_or(DEFAULT_SCAN_SETTLE_MS))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("wifi-connect").join("config.toml"))
}
