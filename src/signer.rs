// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-write signing material
//!
//! Callers hand the engine `(from_address, private_key_bytes)` on every write.
//! [`TransactionSigner`] checks that the key belongs to the declared sender
//! and signs legacy (EIP-155) transactions locally; key material is never
//! persisted and never leaves the process.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::errors::SendTransactionError;

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// EIP-2718 encoded bytes
    pub encoded: Bytes,
    /// Transaction hash
    pub hash: TxHash,
}

/// Signing key bound to the account it signs for.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::{address, hex};
/// use tokenops::TransactionSigner;
///
/// let key = hex!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
/// let from = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// let signer = TransactionSigner::from_private_key(from, &key).unwrap();
/// assert_eq!(signer.address(), from);
/// ```
#[derive(Clone)]
pub struct TransactionSigner {
    from: Address,
    key: PrivateKeySigner,
}

impl std::fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSigner")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl TransactionSigner {
    /// Decodes `private_key` and checks it controls `from`.
    ///
    /// # Errors
    ///
    /// - [`SendTransactionError::InvalidKey`] if the bytes are not a secp256k1 key
    /// - [`SendTransactionError::SignerMismatch`] if the key derives another address
    pub fn from_private_key(from: Address, private_key: &[u8]) -> Result<Self, SendTransactionError> {
        let key = PrivateKeySigner::from_slice(private_key).map_err(SendTransactionError::invalid_key)?;
        let derived = key.address();
        if derived != from {
            return Err(SendTransactionError::SignerMismatch {
                expected: from.to_string(),
                derived: derived.to_string(),
            });
        }
        Ok(Self { from, key })
    }

    /// The sending account.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Signs `tx` and returns its encoded form and hash.
    pub fn sign(&self, tx: TxLegacy) -> Result<SignedTransaction, SendTransactionError> {
        let signature = self
            .key
            .sign_hash_sync(&tx.signature_hash())
            .map_err(SendTransactionError::signing)?;
        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let envelope = TxEnvelope::from(signed);
        Ok(SignedTransaction {
            encoded: envelope.encoded_2718().into(),
            hash,
        })
    }
}
