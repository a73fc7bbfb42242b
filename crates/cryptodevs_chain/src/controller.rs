//! Mint controller: the operations a front end drives, and the status it
//! renders.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::contract::ContractBinding;
use crate::error::{ChainError, MintError, Operation};
use crate::session::{SessionState, WalletSession};
use crate::transport::{Connector, PendingTransaction, TransactionReceipt};

/// Front-end facing status. Every field is derived from the last successful
/// contract read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintStatus {
    pub wallet_connected: bool,
    pub presale_started: bool,
    pub presale_ended: bool,
    pub is_owner: bool,
    /// Decimal text so the full 256-bit counter survives.
    pub token_ids_minted: String,
    /// A transaction is waiting for confirmation.
    pub loading: bool,
}

impl Default for MintStatus {
    fn default() -> Self {
        Self {
            wallet_connected: false,
            presale_started: false,
            presale_ended: false,
            is_owner: false,
            token_ids_minted: "0".into(),
            loading: false,
        }
    }
}

/// The single action a front end should offer for a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MintAction {
    Connect,
    Wait,
    StartPresale,
    AwaitPresale,
    PresaleMint,
    PublicMint,
}

impl MintStatus {
    pub fn next_action(&self) -> MintAction {
        if !self.wallet_connected {
            MintAction::Connect
        } else if self.loading {
            MintAction::Wait
        } else if !self.presale_started {
            if self.is_owner {
                MintAction::StartPresale
            } else {
                MintAction::AwaitPresale
            }
        } else if !self.presale_ended {
            MintAction::PresaleMint
        } else {
            MintAction::PublicMint
        }
    }
}

/// Ended iff the close timestamp is strictly before `now`.
pub fn presale_has_ended(ends_at: U256, now: u64) -> bool {
    ends_at < U256::from(now)
}

/// Owner check on hex addresses; case carries no meaning.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// MintController
// ---------------------------------------------------------------------------

/// Mediates every interaction between the front end and the contract.
///
/// Operations take `&mut self`, so one runs at a time against the session.
pub struct MintController {
    session: WalletSession,
    binding: ContractBinding,
    status: MintStatus,
}

impl MintController {
    pub fn new(connector: Arc<dyn Connector>, binding: ContractBinding) -> Self {
        Self {
            session: WalletSession::new(connector),
            binding,
            status: MintStatus::default(),
        }
    }

    pub fn status(&self) -> &MintStatus {
        &self.status
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    pub fn next_action(&self) -> MintAction {
        self.status.next_action()
    }

    fn fail(operation: Operation, source: ChainError) -> MintError {
        let err = MintError::new(operation, source);
        warn!(operation = %operation, kind = %err.kind, error = %err.source, "operation failed");
        err
    }

    /// Open (or reuse) the wallet session. The network is not checked here.
    pub async fn connect(&mut self) -> Result<(), MintError> {
        self.session
            .connect()
            .await
            .map_err(|e| Self::fail(Operation::Connect, e))?;
        self.status.wallet_connected = true;
        Ok(())
    }

    /// Wait for `pending`, holding `loading` for the duration. `loading` is
    /// cleared whether or not confirmation succeeds.
    async fn confirm(&mut self, pending: PendingTransaction) -> Result<TransactionReceipt, ChainError> {
        self.status.loading = true;
        let outcome = pending.wait().await;
        self.status.loading = false;
        outcome
    }

    pub async fn presale_mint(&mut self) -> Result<TransactionReceipt, MintError> {
        let op = Operation::PresaleMint;
        let handle = self
            .session
            .signing(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let pending = handle.presale_mint().await.map_err(|e| Self::fail(op, e))?;
        let receipt = self.confirm(pending).await.map_err(|e| Self::fail(op, e))?;
        info!(tx = %receipt.transaction_hash, "presale mint confirmed");
        Ok(receipt)
    }

    pub async fn public_mint(&mut self) -> Result<TransactionReceipt, MintError> {
        let op = Operation::PublicMint;
        let handle = self
            .session
            .signing(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let pending = handle.mint().await.map_err(|e| Self::fail(op, e))?;
        let receipt = self.confirm(pending).await.map_err(|e| Self::fail(op, e))?;
        info!(tx = %receipt.transaction_hash, "public mint confirmed");
        Ok(receipt)
    }

    /// Start the presale (the contract enforces ownership), then refresh
    /// `presale_started`. A failed refresh does not fail the operation.
    pub async fn start_presale(&mut self) -> Result<TransactionReceipt, MintError> {
        let op = Operation::StartPresale;
        let handle = self
            .session
            .signing(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let pending = handle.start_presale().await.map_err(|e| Self::fail(op, e))?;
        let receipt = self.confirm(pending).await.map_err(|e| Self::fail(op, e))?;
        info!(tx = %receipt.transaction_hash, "presale started");
        let _ = self.check_presale_started().await;
        Ok(receipt)
    }

    /// Query `presaleStarted`. When it has not started, also refresh the
    /// owner flag so the owner can be offered the start action.
    pub async fn check_presale_started(&mut self) -> Result<bool, MintError> {
        let op = Operation::CheckPresaleStarted;
        let handle = self
            .session
            .read_only(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let started = handle.presale_started().await.map_err(|e| Self::fail(op, e))?;
        if !started {
            let _ = self.check_owner().await;
        }
        self.status.presale_started = started;
        Ok(started)
    }

    pub async fn check_presale_ended(&mut self) -> Result<bool, MintError> {
        self.check_presale_ended_at(unix_now()).await
    }

    /// [`check_presale_ended`](Self::check_presale_ended) evaluated at `now`
    /// (unix seconds).
    pub async fn check_presale_ended_at(&mut self, now: u64) -> Result<bool, MintError> {
        let op = Operation::CheckPresaleEnded;
        let handle = self
            .session
            .read_only(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let ends_at = handle.presale_ended().await.map_err(|e| Self::fail(op, e))?;
        let ended = presale_has_ended(ends_at, now);
        self.status.presale_ended = ended;
        Ok(ended)
    }

    /// Compare the contract owner with the connected signer. The flag only
    /// changes when both reads succeed.
    pub async fn check_owner(&mut self) -> Result<bool, MintError> {
        let op = Operation::CheckOwner;
        let owner = self
            .session
            .read_only(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?
            .owner()
            .await
            .map_err(|e| Self::fail(op, e))?;
        let signer = self
            .session
            .signing(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?
            .signer_address();
        let is_owner = addresses_match(&owner.to_checksum(None), &format_lower(signer));
        self.status.is_owner = is_owner;
        Ok(is_owner)
    }

    /// Query `tokenIds` and store it as decimal text.
    pub async fn refresh_minted_count(&mut self) -> Result<String, MintError> {
        let op = Operation::RefreshMintedCount;
        let handle = self
            .session
            .read_only(&self.binding)
            .await
            .map_err(|e| Self::fail(op, e))?;
        let minted = handle.token_ids().await.map_err(|e| Self::fail(op, e))?;
        self.status.token_ids_minted = minted.to_string();
        Ok(self.status.token_ids_minted.clone())
    }

    /// One poll tick: presale state, then the minted count. Failures are
    /// logged by each step and returned; later steps still run.
    pub async fn refresh(&mut self) -> Vec<MintError> {
        let mut errors = Vec::new();
        match self.check_presale_started().await {
            Ok(true) => {
                if let Err(e) = self.check_presale_ended().await {
                    errors.push(e);
                }
            }
            Ok(false) => {}
            Err(e) => errors.push(e),
        }
        if let Err(e) = self.refresh_minted_count().await {
            errors.push(e);
        }
        errors
    }
}

fn format_lower(address: Address) -> String {
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status() {
        let status = MintStatus::default();
        assert_eq!(status.token_ids_minted, "0");
        assert!(!status.loading);
        assert_eq!(status.next_action(), MintAction::Connect);
    }

    #[test]
    fn presale_end_is_strict() {
        let ends_at = U256::from(1_000_000u64);
        assert!(presale_has_ended(ends_at, 1_000_001));
        assert!(!presale_has_ended(ends_at, 1_000_000));
        assert!(!presale_has_ended(ends_at, 999_999));
    }

    #[test]
    fn presale_end_beyond_u64_never_ends() {
        let ends_at = U256::from(u64::MAX) + U256::from(1u64);
        assert!(!presale_has_ended(ends_at, u64::MAX));
    }

    #[test]
    fn addresses_match_ignores_case() {
        assert!(addresses_match(
            "0xABCDEFabcdef0123456789ABCDEFabcdef012345",
            "0xabcdefabcdef0123456789abcdefabcdef012345"
        ));
        assert!(!addresses_match(
            "0xabcdefabcdef0123456789abcdefabcdef012345",
            "0xabcdefabcdef0123456789abcdefabcdef012346"
        ));
    }

    #[test]
    fn next_action_table() {
        let connected = MintStatus {
            wallet_connected: true,
            ..MintStatus::default()
        };
        assert_eq!(connected.next_action(), MintAction::AwaitPresale);

        let owner = MintStatus {
            is_owner: true,
            ..connected.clone()
        };
        assert_eq!(owner.next_action(), MintAction::StartPresale);

        let loading = MintStatus {
            loading: true,
            ..owner.clone()
        };
        assert_eq!(loading.next_action(), MintAction::Wait);

        let presale = MintStatus {
            presale_started: true,
            ..connected.clone()
        };
        assert_eq!(presale.next_action(), MintAction::PresaleMint);

        let public = MintStatus {
            presale_ended: true,
            ..presale
        };
        assert_eq!(public.next_action(), MintAction::PublicMint);
    }

    #[test]
    fn status_serializes_count_as_string() {
        let status = MintStatus {
            token_ids_minted: "100000000000000000000".into(),
            ..MintStatus::default()
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["token_ids_minted"], "100000000000000000000");
    }
}
