//! Error types for wallet sessions and contract operations.

use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::network::describe_chain;

/// EIP-1193 error code for a request the user declined in their wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors raised by the transport, session, and contract layers.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The user declined the wallet's connection prompt.
    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    /// No wallet endpoint answered.
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The wallet is connected but exposes no account to sign with.
    #[error("Wallet exposes no accounts")]
    NoAccount,

    /// The transport reports a chain other than the one the contract lives on.
    #[error("Wrong network: expected chain id {expected}, connected to chain id {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// The user declined to sign a transaction.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// The transaction was mined but its execution reverted.
    #[error("Transaction {0} reverted")]
    Reverted(B256),

    /// JSON-RPC level error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// HTTP or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response that could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChainError {
    /// Whether the wallet answered with the EIP-1193 "user rejected" code.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }

    /// Errors that mean there is no usable wallet connection.
    pub fn is_connector_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRejected(_) | Self::WalletUnavailable(_) | Self::NoAccount
        )
    }
}

// ---------------------------------------------------------------------------
// Operation-level errors
// ---------------------------------------------------------------------------

/// Controller operations, used to tag errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Connect,
    PresaleMint,
    PublicMint,
    StartPresale,
    CheckPresaleStarted,
    CheckPresaleEnded,
    CheckOwner,
    RefreshMintedCount,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::PresaleMint => "presale_mint",
            Self::PublicMint => "public_mint",
            Self::StartPresale => "start_presale",
            Self::CheckPresaleStarted => "check_presale_started",
            Self::CheckPresaleEnded => "check_presale_ended",
            Self::CheckOwner => "check_owner",
            Self::RefreshMintedCount => "refresh_minted_count",
        }
    }

    /// Whether the operation submits a transaction.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::PresaleMint | Self::PublicMint | Self::StartPresale)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to every failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// User rejection or no wallet available.
    Connector,
    /// Connected to a chain other than the expected one.
    NetworkMismatch,
    /// Signature rejected, reverted, or failed while waiting for confirmation.
    Transaction,
    /// A read call failed.
    Query,
}

impl ErrorKind {
    /// Classify `error` raised while running `operation`.
    pub fn classify(error: &ChainError, operation: Operation) -> Self {
        match error {
            e if e.is_connector_error() => Self::Connector,
            ChainError::WrongNetwork { .. } => Self::NetworkMismatch,
            ChainError::TransactionRejected(_) | ChainError::Reverted(_) => Self::Transaction,
            _ if operation == Operation::Connect => Self::Connector,
            _ if operation.is_mutation() => Self::Transaction,
            _ => Self::Query,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connector => "connector",
            Self::NetworkMismatch => "network mismatch",
            Self::Transaction => "transaction",
            Self::Query => "query",
        })
    }
}

/// A failed controller operation: what was attempted, why it failed, and the
/// underlying error.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed ({kind}): {source}")]
pub struct MintError {
    pub operation: Operation,
    pub kind: ErrorKind,
    #[source]
    pub source: ChainError,
}

impl MintError {
    pub fn new(operation: Operation, source: ChainError) -> Self {
        Self {
            operation,
            kind: ErrorKind::classify(&source, operation),
            source,
        }
    }

    /// Returns a user-friendly message (hides transport details).
    pub fn user_message(&self) -> String {
        match &self.source {
            ChainError::WrongNetwork { expected, .. } => {
                format!("Change the network to {}", describe_chain(*expected))
            }
            ChainError::ConnectionRejected(_) => "Wallet connection was rejected.".into(),
            ChainError::WalletUnavailable(_) => {
                "No wallet found. Check that your wallet is running.".into()
            }
            ChainError::NoAccount => "Unlock your wallet and select an account.".into(),
            ChainError::TransactionRejected(_) => "Transaction was rejected in the wallet.".into(),
            ChainError::Reverted(_) => "The contract rejected the transaction.".into(),
            _ => match self.kind {
                ErrorKind::Transaction => "Transaction failed. Check your connection.".into(),
                _ => "Could not read the contract. Check your connection.".into(),
            },
        }
    }
}
