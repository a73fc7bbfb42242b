use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// EVM networks the client knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Goerli,
    Sepolia,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Goerli, Network::Sepolia];

    /// Human-readable label for the network.
    pub fn label(&self) -> &'static str {
        match self {
            Network::Mainnet => "Ethereum Mainnet",
            Network::Goerli => "Goerli",
            Network::Sepolia => "Sepolia",
        }
    }

    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Goerli => 5,
            Network::Sepolia => 11_155_111,
        }
    }

    /// Public RPC endpoint used when no custom endpoint is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://ethereum-rpc.publicnode.com",
            Network::Goerli => "https://ethereum-goerli-rpc.publicnode.com",
            Network::Sepolia => "https://ethereum-sepolia-rpc.publicnode.com",
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for an arbitrary chain id: the network name when known, otherwise
/// `chain <id>`.
pub fn describe_chain(chain_id: u64) -> String {
    match Network::from_chain_id(chain_id) {
        Some(network) => network.label().to_string(),
        None => format!("chain {chain_id}"),
    }
}

/// The chain id a transport reports, checked against the one the contract
/// lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub chain_id: u64,
}

impl NetworkIdentity {
    pub fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    /// Fails with [`ChainError::WrongNetwork`] unless this is `expected`.
    pub fn ensure(&self, expected: u64) -> Result<(), ChainError> {
        if self.chain_id != expected {
            return Err(ChainError::WrongNetwork {
                expected,
                actual: self.chain_id,
            });
        }
        Ok(())
    }

    pub fn network(&self) -> Option<Network> {
        Network::from_chain_id(self.chain_id)
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_chain(self.chain_id))
    }
}
