//! Typed binding to the Crypto Devs collection contract.
//!
//! A [`ContractHandle`] is either [`ReadOnly`] or [`Signing`]; only signing
//! handles expose the transaction-submitting methods.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use tracing::{debug, info};

use crate::error::ChainError;
use crate::transport::{PendingTransaction, TransactionRequest, Transport};

sol! {
    interface ICryptoDevs {
        function presaleMint() external payable;
        function mint() external payable;
        function startPresale() external;
        function presaleStarted() external view returns (bool started);
        function presaleEnded() external view returns (uint256 endsAt);
        function owner() external view returns (address account);
        function tokenIds() external view returns (uint256 minted);
    }
}

/// Where the contract lives and how transactions against it are paid for and
/// confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBinding {
    pub address: Address,
    pub expected_chain_id: u64,
    /// Payment attached to each mint, in wei.
    pub mint_price: U256,
    pub confirmation_poll: Duration,
}

impl ContractBinding {
    pub fn new(
        address: &str,
        expected_chain_id: u64,
        mint_price_eth: &str,
    ) -> Result<Self, ChainError> {
        let address = Address::from_str(address.trim())
            .map_err(|e| ChainError::InvalidAddress(format!("{address}: {e}")))?;
        Ok(Self {
            address,
            expected_chain_id,
            mint_price: parse_mint_price(mint_price_eth)?,
            confirmation_poll: Duration::from_secs(1),
        })
    }

    pub fn with_confirmation_poll(mut self, interval: Duration) -> Self {
        self.confirmation_poll = interval;
        self
    }
}

/// Convert a decimal ether amount (`"0.01"`) to wei.
pub fn parse_mint_price(eth: &str) -> Result<U256, ChainError> {
    parse_ether(eth.trim()).map_err(|e| ChainError::InvalidAmount(format!("{eth}: {e}")))
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Handle mode that can only query.
#[derive(Debug, Clone, Copy)]
pub struct ReadOnly;

/// Handle mode that can submit transactions from `from`.
#[derive(Debug, Clone, Copy)]
pub struct Signing {
    pub from: Address,
}

// ---------------------------------------------------------------------------
// ContractHandle
// ---------------------------------------------------------------------------

pub struct ContractHandle<M> {
    binding: ContractBinding,
    transport: Arc<dyn Transport>,
    mode: M,
}

impl<M> ContractHandle<M> {
    pub fn address(&self) -> Address {
        self.binding.address
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let data = Bytes::from(call.abi_encode());
        let output = self.transport.call(self.binding.address, data).await?;
        C::abi_decode_returns(&output, true)
            .map_err(|e| ChainError::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    pub async fn presale_started(&self) -> Result<bool, ChainError> {
        Ok(self.read(ICryptoDevs::presaleStartedCall {}).await?.started)
    }

    /// Unix timestamp (seconds) at which the presale closes.
    pub async fn presale_ended(&self) -> Result<U256, ChainError> {
        Ok(self.read(ICryptoDevs::presaleEndedCall {}).await?.endsAt)
    }

    pub async fn owner(&self) -> Result<Address, ChainError> {
        Ok(self.read(ICryptoDevs::ownerCall {}).await?.account)
    }

    /// Number of tokens minted so far.
    pub async fn token_ids(&self) -> Result<U256, ChainError> {
        Ok(self.read(ICryptoDevs::tokenIdsCall {}).await?.minted)
    }
}

impl ContractHandle<ReadOnly> {
    pub fn read_only(binding: ContractBinding, transport: Arc<dyn Transport>) -> Self {
        Self {
            binding,
            transport,
            mode: ReadOnly,
        }
    }
}

impl ContractHandle<Signing> {
    pub fn signing(binding: ContractBinding, transport: Arc<dyn Transport>, from: Address) -> Self {
        Self {
            binding,
            transport,
            mode: Signing { from },
        }
    }

    /// Address transactions are sent from.
    pub fn signer_address(&self) -> Address {
        self.mode.from
    }

    async fn submit<C: SolCall>(&self, call: C, value: U256) -> Result<PendingTransaction, ChainError> {
        let tx = TransactionRequest {
            from: self.mode.from,
            to: self.binding.address,
            value,
            data: Bytes::from(call.abi_encode()),
        };
        debug!(method = C::SIGNATURE, from = %tx.from, value = %value, "submitting transaction");
        let hash = self.transport.send_transaction(&tx).await?;
        info!(method = C::SIGNATURE, tx = %hash, "transaction submitted");
        Ok(PendingTransaction::new(
            hash,
            Arc::clone(&self.transport),
            self.binding.confirmation_poll,
        ))
    }

    /// Mint during the presale, paying the configured price.
    pub async fn presale_mint(&self) -> Result<PendingTransaction, ChainError> {
        self.submit(ICryptoDevs::presaleMintCall {}, self.binding.mint_price)
            .await
    }

    /// Mint after the presale, paying the configured price.
    pub async fn mint(&self) -> Result<PendingTransaction, ChainError> {
        self.submit(ICryptoDevs::mintCall {}, self.binding.mint_price)
            .await
    }

    pub async fn start_presale(&self) -> Result<PendingTransaction, ChainError> {
        self.submit(ICryptoDevs::startPresaleCall {}, U256::ZERO).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_price_is_one_hundredth_ether_in_wei() {
        let wei = parse_mint_price("0.01").unwrap();
        assert_eq!(wei, U256::from(10_000_000_000_000_000u64));
    }

    #[test]
    fn mint_price_rejects_garbage() {
        assert!(matches!(
            parse_mint_price("one cent"),
            Err(ChainError::InvalidAmount(_))
        ));
    }

    #[test]
    fn binding_parses_address_case_insensitively() {
        let lower = ContractBinding::new("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd", 5, "0.01")
            .unwrap();
        let upper = ContractBinding::new("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD", 5, "0.01")
            .unwrap();
        assert_eq!(lower.address, upper.address);
        assert_eq!(lower.expected_chain_id, 5);
    }

    #[test]
    fn binding_rejects_bad_address() {
        let err = ContractBinding::new("0x1234", 5, "0.01").unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress(_)));
    }

    #[test]
    fn selectors_match_solidity_signatures() {
        assert_eq!(ICryptoDevs::presaleMintCall::SIGNATURE, "presaleMint()");
        assert_eq!(ICryptoDevs::mintCall::SIGNATURE, "mint()");
        assert_eq!(ICryptoDevs::tokenIdsCall::SIGNATURE, "tokenIds()");
        // keccak256("mint()")[..4]
        assert_eq!(ICryptoDevs::mintCall::SELECTOR, [0x12, 0x49, 0xc5, 0x8b]);
        assert_eq!(ICryptoDevs::ownerCall {}.abi_encode(), vec![0x8d, 0xa5, 0xcb, 0x5b]);
    }
}
