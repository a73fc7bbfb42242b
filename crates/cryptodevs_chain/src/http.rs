//! JSON-RPC over HTTP wallet transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, U64};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::ChainError;
use crate::network::describe_chain;
use crate::rpc_config::{RpcConfig, validate_url};
use crate::transport::{Connector, TransactionReceipt, TransactionRequest, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    EthChainId,
    EthAccounts,
    EthCall,
    EthSendTransaction,
    EthGetTransactionReceipt,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EthChainId => "eth_chainId",
            Self::EthAccounts => "eth_accounts",
            Self::EthCall => "eth_call",
            Self::EthSendTransaction => "eth_sendTransaction",
            Self::EthGetTransactionReceipt => "eth_getTransactionReceipt",
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Turn a decoded JSON-RPC envelope into its result. A `null` or missing
/// result is returned as [`Value::Null`].
fn into_result(response: JsonRpcResponse) -> Result<Value, ChainError> {
    if let Some(err) = response.error {
        return Err(ChainError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    Ok(response.result.unwrap_or(Value::Null))
}

fn decode<T: DeserializeOwned>(method: RpcMethod, value: Value) -> Result<T, ChainError> {
    serde_json::from_value(value)
        .map_err(|e| ChainError::Decode(format!("{}: {e}", method.as_str())))
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// Wallet transport speaking JSON-RPC to an HTTP endpoint.
pub struct HttpTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ChainError> {
        if !validate_url(url) {
            return Err(ChainError::InvalidEndpoint(url.to_string()));
        }
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: RpcMethod, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method: method.as_str(),
            params: &params,
        };
        debug!(id, method = method.as_str(), "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{} request failed: {e}", method.as_str())))?
            .error_for_status()
            .map_err(|e| ChainError::Transport(format!("{}: {e}", method.as_str())))?;

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("{}: invalid JSON: {e}", method.as_str())))?;

        into_result(envelope)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        let value = self.request(RpcMethod::EthChainId, json!([])).await?;
        let id: U64 = decode(RpcMethod::EthChainId, value)?;
        Ok(id.to::<u64>())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        let value = self
            .request(RpcMethod::EthAccounts, json!([]))
            .await
            .map_err(|e| match e {
                e if e.is_user_rejection() => ChainError::ConnectionRejected(e.to_string()),
                e => e,
            })?;
        decode(RpcMethod::EthAccounts, value)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let params = json!([{ "to": to, "data": data }, "latest"]);
        let value = self.request(RpcMethod::EthCall, params).await?;
        decode(RpcMethod::EthCall, value)
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ChainError> {
        let value = self
            .request(RpcMethod::EthSendTransaction, json!([tx]))
            .await
            .map_err(|e| match e {
                ChainError::Rpc { code, message } if code == crate::error::USER_REJECTED_CODE => {
                    ChainError::TransactionRejected(message)
                }
                e => e,
            })?;
        decode(RpcMethod::EthSendTransaction, value)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let value = self
            .request(RpcMethod::EthGetTransactionReceipt, json!([hash]))
            .await?;
        decode(RpcMethod::EthGetTransactionReceipt, value)
    }
}

// ---------------------------------------------------------------------------
// HttpConnector
// ---------------------------------------------------------------------------

/// Connects to a wallet endpoint over HTTP and probes it with `eth_chainId`.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn from_rpc_config(rpc: &RpcConfig) -> Self {
        Self::new(rpc.url.clone(), Duration::from_secs(rpc.timeout_secs))
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, ChainError> {
        let transport = HttpTransport::new(&self.url, self.timeout)?;
        let chain_id = transport.chain_id().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "wallet endpoint did not answer");
            match e {
                e if e.is_user_rejection() => ChainError::ConnectionRejected(e.to_string()),
                e => ChainError::WalletUnavailable(format!("{}: {e}", self.url)),
            }
        })?;
        info!(url = %self.url, network = %describe_chain(chain_id), "wallet endpoint connected");
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Ok(transport)
    }
}
