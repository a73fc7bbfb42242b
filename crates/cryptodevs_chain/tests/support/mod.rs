//! In-memory wallet and contract used by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, U64, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use cryptodevs_chain::{
    ChainError, Connector, ContractBinding, ICryptoDevs, TransactionReceipt, TransactionRequest,
    Transport,
};

pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// What the wallet does with `eth_sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBehavior {
    Confirm,
    Reject,
    Revert,
}

#[derive(Debug, Clone)]
pub struct ContractState {
    pub presale_started: bool,
    pub presale_ends_at: U256,
    pub owner: Address,
    pub token_ids: U256,
}

pub struct MockWallet {
    pub chain_id: Mutex<u64>,
    pub accounts: Mutex<Vec<Address>>,
    pub contract: Mutex<ContractState>,
    pub send_behavior: Mutex<SendBehavior>,
    /// Read methods that fail with a transport error, by selector.
    pub failing_reads: Mutex<Vec<[u8; 4]>>,
    pub chain_id_queries: AtomicUsize,
    pub contract_calls: AtomicUsize,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl MockWallet {
    pub fn new(chain_id: u64, signer: Address) -> Arc<Self> {
        Arc::new(Self {
            chain_id: Mutex::new(chain_id),
            accounts: Mutex::new(vec![signer]),
            contract: Mutex::new(ContractState {
                presale_started: false,
                presale_ends_at: U256::ZERO,
                owner: Address::repeat_byte(0xee),
                token_ids: U256::ZERO,
            }),
            send_behavior: Mutex::new(SendBehavior::Confirm),
            failing_reads: Mutex::new(vec![]),
            chain_id_queries: AtomicUsize::new(0),
            contract_calls: AtomicUsize::new(0),
            sent: Mutex::new(vec![]),
        })
    }

    pub fn with_contract(self: Arc<Self>, f: impl FnOnce(&mut ContractState)) -> Arc<Self> {
        f(&mut self.contract.lock().unwrap());
        self
    }

    pub fn set_send_behavior(&self, behavior: SendBehavior) {
        *self.send_behavior.lock().unwrap() = behavior;
    }

    pub fn fail_read(&self, selector: [u8; 4]) {
        self.failing_reads.lock().unwrap().push(selector);
    }

    /// Contract interactions of any kind: reads plus submitted transactions.
    pub fn contract_interactions(&self) -> usize {
        self.contract_calls.load(Ordering::SeqCst) + self.sent.lock().unwrap().len()
    }

    fn tx_hash(&self) -> B256 {
        let n = self.sent.lock().unwrap().len() as u8;
        B256::repeat_byte(n)
    }
}

#[async_trait]
impl Transport for MockWallet {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.chain_id_queries.fetch_add(1, Ordering::SeqCst);
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        self.contract_calls.fetch_add(1, Ordering::SeqCst);
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ChainError::Decode("short calldata".into()))?;
        if self.failing_reads.lock().unwrap().contains(&selector) {
            return Err(ChainError::Transport("connection reset".into()));
        }

        let state = self.contract.lock().unwrap().clone();
        let encoded = if selector == ICryptoDevs::presaleStartedCall::SELECTOR {
            state.presale_started.abi_encode()
        } else if selector == ICryptoDevs::presaleEndedCall::SELECTOR {
            state.presale_ends_at.abi_encode()
        } else if selector == ICryptoDevs::ownerCall::SELECTOR {
            state.owner.abi_encode()
        } else if selector == ICryptoDevs::tokenIdsCall::SELECTOR {
            state.token_ids.abi_encode()
        } else {
            return Err(ChainError::Rpc {
                code: -32000,
                message: format!("execution reverted: unknown selector {selector:?}"),
            });
        };
        Ok(Bytes::from(encoded))
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ChainError> {
        if *self.send_behavior.lock().unwrap() == SendBehavior::Reject {
            return Err(ChainError::TransactionRejected("User denied transaction".into()));
        }
        self.sent.lock().unwrap().push(tx.clone());
        if tx.data[..] == ICryptoDevs::startPresaleCall::SELECTOR[..] {
            self.contract.lock().unwrap().presale_started = true;
        }
        Ok(self.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let status = match *self.send_behavior.lock().unwrap() {
            SendBehavior::Revert => 0u64,
            _ => 1,
        };
        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(U64::from(1)),
            status: Some(U64::from(status)),
        }))
    }
}

pub struct MockConnector {
    pub wallet: Arc<MockWallet>,
    pub reject: Mutex<bool>,
    pub connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(wallet: Arc<MockWallet>) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            reject: Mutex::new(false),
            connects: AtomicUsize::new(0),
        })
    }

    pub fn rejecting(wallet: Arc<MockWallet>) -> Arc<Self> {
        let connector = Self::new(wallet);
        *connector.reject.lock().unwrap() = true;
        connector
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChainError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if *self.reject.lock().unwrap() {
            return Err(ChainError::ConnectionRejected("User rejected the request".into()));
        }
        let transport: Arc<dyn Transport> = self.wallet.clone();
        Ok(transport)
    }
}

pub fn binding(expected_chain_id: u64) -> ContractBinding {
    ContractBinding::new(CONTRACT, expected_chain_id, "0.01")
        .unwrap()
        .with_confirmation_poll(Duration::from_millis(1))
}
