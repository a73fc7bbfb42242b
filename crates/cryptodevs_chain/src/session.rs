use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::contract::{ContractBinding, ContractHandle, ReadOnly, Signing};
use crate::error::ChainError;
use crate::network::NetworkIdentity;
use crate::transport::{Connector, Transport};

/// Lifecycle of the wallet connection. There is no disconnect: a session is
/// abandoned, not closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// The one wallet connection, opened lazily and reused by every operation.
pub struct WalletSession {
    connector: Arc<dyn Connector>,
    state: SessionState,
    transport: Option<Arc<dyn Transport>>,
    signer: Option<Address>,
}

impl WalletSession {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            state: SessionState::Disconnected,
            transport: None,
            signer: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Signer address, if one has been derived already.
    pub fn cached_signer(&self) -> Option<Address> {
        self.signer
    }

    /// Open the connection, or return the existing one.
    pub async fn connect(&mut self) -> Result<Arc<dyn Transport>, ChainError> {
        if let Some(transport) = &self.transport {
            return Ok(Arc::clone(transport));
        }

        self.state = SessionState::Connecting;
        debug!("opening wallet connection");
        match self.connector.connect().await {
            Ok(transport) => {
                self.state = SessionState::Connected;
                self.transport = Some(Arc::clone(&transport));
                info!("wallet session connected");
                Ok(transport)
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                warn!(error = %e, "wallet connection failed");
                Err(e)
            }
        }
    }

    /// Connect if needed and check the wallet is on `expected_chain_id`.
    async fn checked_transport(
        &mut self,
        expected_chain_id: u64,
    ) -> Result<Arc<dyn Transport>, ChainError> {
        let transport = self.connect().await?;
        let identity = NetworkIdentity::new(transport.chain_id().await?);
        if let Err(e) = identity.ensure(expected_chain_id) {
            warn!(expected = expected_chain_id, actual = identity.chain_id, "wrong network");
            return Err(e);
        }
        Ok(transport)
    }

    /// Address of the account that signs, derived once from the wallet's
    /// exposed accounts.
    pub async fn signer_address(&mut self) -> Result<Address, ChainError> {
        if let Some(address) = self.signer {
            return Ok(address);
        }
        let transport = self.connect().await?;
        let address = transport
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ChainError::NoAccount)?;
        debug!(signer = %address, "signer derived");
        self.signer = Some(address);
        Ok(address)
    }

    /// Handle for queries. Fails on the wrong network before any call.
    pub async fn read_only(
        &mut self,
        binding: &ContractBinding,
    ) -> Result<ContractHandle<ReadOnly>, ChainError> {
        let transport = self.checked_transport(binding.expected_chain_id).await?;
        Ok(ContractHandle::read_only(binding.clone(), transport))
    }

    /// Handle that can submit transactions. Fails on the wrong network before
    /// any call.
    pub async fn signing(
        &mut self,
        binding: &ContractBinding,
    ) -> Result<ContractHandle<Signing>, ChainError> {
        let transport = self.checked_transport(binding.expected_chain_id).await?;
        let from = self.signer_address().await?;
        Ok(ContractHandle::signing(binding.clone(), transport, from))
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("state", &self.state)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}
