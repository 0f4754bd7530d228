//! Helpers for building signed transactions in tests.

use crate::L2Transaction;
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_primitives::{Address, B256, Bytes, TxKind, U256, b256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// Private key used to sign test transactions.
pub const TEST_SIGNER_KEY: B256 =
    b256!("0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318");

/// Returns the signer backing [`TEST_SIGNER_KEY`].
pub fn test_signer() -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&TEST_SIGNER_KEY).expect("valid test key")
}

/// Returns the address of [`TEST_SIGNER_KEY`].
pub fn test_sender() -> Address {
    test_signer().address()
}

/// Signs `tx` with [`TEST_SIGNER_KEY`].
pub fn sign_legacy(tx: TxLegacy) -> L2Transaction {
    let signature = test_signer().sign_hash_sync(&tx.signature_hash()).expect("signing succeeds");
    tx.into_signed(signature)
}

/// Builds and signs a legacy transaction.
///
/// `to == None` produces a contract creation.
pub fn legacy_tx(
    nonce: u64,
    to: Option<Address>,
    input: Bytes,
    chain_id: Option<u64>,
) -> L2Transaction {
    sign_legacy(TxLegacy {
        chain_id,
        nonce,
        gas_price: 1_000_000_000,
        gas_limit: 100_000,
        to: to.map_or(TxKind::Create, TxKind::Call),
        value: U256::from(nonce),
        input,
    })
}
