use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::network::Network;

/// Configuration for a single RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub network: Network,
    pub url: String,
    pub is_custom: bool,
    pub timeout_secs: u64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Manages per-network RPC endpoint configuration with custom override support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfigStore {
    configs: HashMap<Network, RpcConfig>,
}

impl RpcConfigStore {
    /// Create a store populated with each network's public endpoint.
    pub fn with_defaults() -> Self {
        let configs = Network::ALL
            .into_iter()
            .map(|network| {
                let rpc = RpcConfig {
                    network,
                    url: network.default_rpc_url().to_string(),
                    is_custom: false,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                };
                (network, rpc)
            })
            .collect();

        Self { configs }
    }

    /// Get the RPC configuration for a network.
    pub fn get_rpc(&self, network: Network) -> Option<&RpcConfig> {
        self.configs.get(&network)
    }

    /// Override the RPC URL for a network with a custom endpoint.
    ///
    /// Returns `Err` if the URL fails validation.
    pub fn set_custom_rpc(&mut self, network: Network, url: String) -> Result<(), ChainError> {
        if !validate_url(&url) {
            return Err(ChainError::InvalidEndpoint(url));
        }

        let entry = self.entry(network);
        entry.url = url;
        entry.is_custom = true;
        Ok(())
    }

    /// Set the per-request timeout for a network's endpoint.
    pub fn set_timeout(&mut self, network: Network, timeout_secs: u64) {
        self.entry(network).timeout_secs = timeout_secs;
    }

    /// Reset a network's RPC URL back to the built-in default.
    pub fn reset_to_default(&mut self, network: Network) {
        let entry = self.entry(network);
        entry.url = network.default_rpc_url().to_string();
        entry.is_custom = false;
    }

    fn entry(&mut self, network: Network) -> &mut RpcConfig {
        self.configs.entry(network).or_insert_with(|| RpcConfig {
            network,
            url: network.default_rpc_url().to_string(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }
}

impl Default for RpcConfigStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
