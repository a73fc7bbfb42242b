//! Wallet session and contract client for the Crypto Devs collection.

pub mod contract;
pub mod controller;
pub mod error;
pub mod http;
pub mod network;
pub mod rpc_config;
pub mod session;
pub mod transport;

// Re-export primary types for convenient access.
pub use contract::{ContractBinding, ContractHandle, ICryptoDevs, ReadOnly, Signing, parse_mint_price};
pub use controller::{MintAction, MintController, MintStatus, addresses_match, presale_has_ended};
pub use error::{ChainError, ErrorKind, MintError, Operation};
pub use http::{HttpConnector, HttpTransport};
pub use network::{Network, NetworkIdentity};
pub use rpc_config::{RpcConfig, RpcConfigStore, validate_url};
pub use session::{SessionState, WalletSession};
pub use transport::{Connector, PendingTransaction, TransactionReceipt, TransactionRequest, Transport};
