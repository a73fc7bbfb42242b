mod support;

use std::sync::atomic::Ordering;

use alloy_primitives::Address;

use cryptodevs_chain::{ChainError, SessionState, WalletSession};
use support::{MockConnector, MockWallet, binding};

#[tokio::test]
async fn new_session_is_disconnected() {
    let connector = MockConnector::new(MockWallet::new(5, Address::repeat_byte(1)));
    let session = WalletSession::new(connector.clone());
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.cached_signer().is_none());
    assert_eq!(connector.connects(), 0);
}

#[tokio::test]
async fn connect_is_reused() {
    let connector = MockConnector::new(MockWallet::new(5, Address::repeat_byte(1)));
    let mut session = WalletSession::new(connector.clone());

    session.connect().await.unwrap();
    session.connect().await.unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn rejected_connect_returns_to_disconnected() {
    let connector = MockConnector::rejecting(MockWallet::new(5, Address::repeat_byte(1)));
    let mut session = WalletSession::new(connector);

    let err = session.connect().await.err().unwrap();
    assert!(matches!(err, ChainError::ConnectionRejected(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn first_handle_resolution_connects() {
    let connector = MockConnector::new(MockWallet::new(5, Address::repeat_byte(1)));
    let mut session = WalletSession::new(connector.clone());

    session.read_only(&binding(5)).await.unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(connector.connects(), 1);
}

#[tokio::test]
async fn wrong_network_fails_before_any_contract_call() {
    for actual in [1u64, 4, 137, 11_155_111] {
        let wallet = MockWallet::new(actual, Address::repeat_byte(1));
        let mut session = WalletSession::new(MockConnector::new(wallet.clone()));

        let read = session.read_only(&binding(5)).await.err().unwrap();
        let sign = session.signing(&binding(5)).await.err().unwrap();
        for err in [read, sign] {
            assert!(matches!(
                err,
                ChainError::WrongNetwork { expected: 5, actual: a } if a == actual
            ));
        }
        assert_eq!(wallet.contract_interactions(), 0);
        assert_eq!(wallet.chain_id_queries.load(Ordering::SeqCst), 2);
    }
}

#[tokio::test]
async fn signer_is_derived_once_and_cached() {
    let signer = Address::repeat_byte(0x42);
    let wallet = MockWallet::new(5, signer);
    let mut session = WalletSession::new(MockConnector::new(wallet.clone()));

    let handle = session.signing(&binding(5)).await.unwrap();
    assert_eq!(handle.signer_address(), signer);
    assert_eq!(session.cached_signer(), Some(signer));

    // Later account changes do not affect the cached identity.
    wallet.accounts.lock().unwrap().clear();
    assert_eq!(session.signer_address().await.unwrap(), signer);
}

#[tokio::test]
async fn signing_without_accounts_is_no_account() {
    let wallet = MockWallet::new(5, Address::repeat_byte(1));
    wallet.accounts.lock().unwrap().clear();
    let mut session = WalletSession::new(MockConnector::new(wallet));

    let err = session.signing(&binding(5)).await.err().unwrap();
    assert!(matches!(err, ChainError::NoAccount));
}
