use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Chain id of the Goerli test network, where the collection is deployed.
pub const DEFAULT_CHAIN_ID: u64 = 5;

/// Price of one token in ether, as a decimal string.
pub const DEFAULT_MINT_PRICE_ETH: &str = "0.01";

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Application configuration stored at `~/.cryptodevs/config.json`.
///
/// Every field has a compiled-in default, so a partial or missing file is
/// always usable. The contract address has no default and must be set before
/// any contract operation can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Wallet endpoint
    pub rpc_url: Option<String>,
    pub request_timeout_secs: u64,

    // Contract
    pub contract_address: Option<String>,
    pub expected_chain_id: u64,
    pub mint_price_eth: String,

    // Polling
    pub poll_interval_secs: u64,
    pub confirmation_poll_ms: u64,

    // General
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            request_timeout_secs: 30,
            contract_address: None,
            expected_chain_id: DEFAULT_CHAIN_ID,
            mint_price_eth: DEFAULT_MINT_PRICE_ETH.into(),
            poll_interval_secs: 5,
            confirmation_poll_ms: 1_000,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Returns the base config directory: `~/.cryptodevs/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".cryptodevs"))
    }

    /// Returns the config file path: `~/.cryptodevs/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.cryptodevs/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        let dirs = [Self::base_dir()?, Self::logs_dir()?];
        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from disk, or creates default if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Saves config to `~/.cryptodevs/config.json`.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
