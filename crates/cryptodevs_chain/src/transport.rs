//! Wallet transport seam.
//!
//! A [`Connector`] opens a connection to the user's wallet and yields a
//! [`Transport`], the EIP-1193 style request surface everything else is
//! built on. [`crate::http`] provides the JSON-RPC over HTTP implementation.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChainError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A transaction for the wallet to sign and broadcast (`eth_sendTransaction`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    #[serde(skip_serializing_if = "U256::is_zero")]
    pub value: U256,
    pub data: Bytes,
}

/// The subset of a transaction receipt the client acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `1` for success, `0` for a reverted execution. Absent on pre-Byzantium
    /// chains, where it is treated as success.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|s| s == U64::from(1))
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Request surface of a connected wallet.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Chain id the wallet is currently on (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Accounts the wallet exposes; the first one signs (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Read-only contract call against the latest block (`eth_call`).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;

    /// Ask the wallet to sign and broadcast a transaction. Returns its hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ChainError>;

    /// Receipt for a transaction, or `None` while it is still pending.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError>;
}

/// Opens wallet connections. May prompt the user.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChainError>;
}

// ---------------------------------------------------------------------------
// PendingTransaction
// ---------------------------------------------------------------------------

/// A submitted transaction that has not been confirmed yet.
pub struct PendingTransaction {
    hash: B256,
    transport: Arc<dyn Transport>,
    poll_interval: Duration,
}

impl PendingTransaction {
    pub fn new(hash: B256, transport: Arc<dyn Transport>, poll_interval: Duration) -> Self {
        Self {
            hash,
            transport,
            poll_interval,
        }
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Poll for the receipt until the transaction is mined.
    ///
    /// There is no deadline: a transaction that never lands keeps this
    /// future pending. A reverted receipt is an error.
    pub async fn wait(self) -> Result<TransactionReceipt, ChainError> {
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            if let Some(receipt) = self.transport.transaction_receipt(self.hash).await? {
                if !receipt.succeeded() {
                    warn!(tx = %self.hash, polls, "transaction reverted");
                    return Err(ChainError::Reverted(self.hash));
                }
                debug!(tx = %self.hash, polls, block = ?receipt.block_number, "transaction confirmed");
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl std::fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
