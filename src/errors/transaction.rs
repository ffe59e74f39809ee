// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for state-changing transactions.
//!
//! Every write returns exactly one of three failure kinds, wrapped in
//! [`TransactionError`]:
//!
//! - [`ContractRevert`] - the contract rejected the call (decoded message)
//! - [`SendTransactionError`] - the transaction could not be signed, sent, or confirmed
//! - [`ValidationError`] - the request was malformed; nothing touched the network

use std::time::Duration;

use alloy_primitives::TxHash;

use super::{RpcError, ValidationError};

/// A revert decoded into a domain message.
///
/// `code` is the numeric contract error code when the revert reason carried
/// one; `message` is the translated text, or the raw reason when the code is
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ContractRevert {
    /// Numeric contract error code, if the reason carried one
    pub code: Option<u32>,
    /// Domain error message
    pub message: String,
}

impl ContractRevert {
    /// Creates a revert with a known numeric code.
    pub fn new(code: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failures on the send side of a transaction.
///
/// Use [`outcome_unknown`](Self::outcome_unknown) to tell "the transaction may
/// still land, reconcile later" apart from
/// [`rejected_before_send`](Self::rejected_before_send).
#[derive(Debug, thiserror::Error)]
pub enum SendTransactionError {
    /// The private key bytes do not decode to a secp256k1 key.
    #[error("Invalid private key material")]
    InvalidKey {
        /// The underlying decoding error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The private key does not belong to the declared sender.
    #[error("Private key belongs to {derived}, not to sender {expected}")]
    SignerMismatch {
        /// Declared sender address
        expected: String,
        /// Address derived from the key
        derived: String,
    },

    /// Signing the transaction failed.
    #[error("Failed to sign transaction")]
    Signing {
        /// The underlying signer error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A ledger call required before sending failed (nonce lookup or simulation).
    #[error("Failed to prepare transaction during {stage}")]
    Preparation {
        /// Step that failed ("nonce", "simulation")
        stage: &'static str,
        /// The underlying RPC error
        #[source]
        source: RpcError,
    },

    /// The node refused the signed transaction.
    ///
    /// Nonce collisions ("nonce too low") surface here.
    #[error("Node rejected transaction: {message}")]
    Rejected {
        /// Message reported by the node
        message: String,
    },

    /// The node already holds this exact transaction in its pool.
    ///
    /// The submitter keeps waiting for the receipt of the known hash; this
    /// variant only surfaces to callers that classify send failures directly.
    #[error("Node already knows transaction: {message}")]
    AlreadyKnown {
        /// Message reported by the node
        message: String,
    },

    /// The transport failed while sending; the node may or may not have the transaction.
    #[error("Transport failed while sending transaction")]
    SendFailed {
        /// The underlying RPC error
        #[source]
        source: RpcError,
    },

    /// No receipt appeared within the wait window.
    #[error("Transaction {tx_hash} was not mined within {timeout:?}")]
    ReceiptTimeout {
        /// Hash of the sent transaction
        tx_hash: TxHash,
        /// Configured wait window
        timeout: Duration,
    },

    /// Looking up the receipt failed at the transport level.
    #[error("Failed to look up receipt for {tx_hash}")]
    ReceiptLookup {
        /// Hash of the sent transaction
        tx_hash: TxHash,
        /// The underlying RPC error
        #[source]
        source: RpcError,
    },

    /// The transaction was mined with a failure status and the revert could not be replayed.
    #[error("Transaction {tx_hash} failed on chain")]
    ReceiptFailed {
        /// Hash of the failed transaction
        tx_hash: TxHash,
    },

    /// A deployment receipt did not carry a contract address.
    #[error("Deployment {tx_hash} produced no contract address")]
    MissingContractAddress {
        /// Hash of the deployment transaction
        tx_hash: TxHash,
    },
}

impl SendTransactionError {
    /// Helper to create an `InvalidKey` error from any error type.
    pub fn invalid_key(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        SendTransactionError::InvalidKey {
            source: Box::new(source),
        }
    }

    /// Helper to create a `Signing` error from any error type.
    pub fn signing(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        SendTransactionError::Signing {
            source: Box::new(source),
        }
    }

    /// Classifies an RPC failure raised by `eth_sendRawTransaction`.
    pub fn from_send_failure(error: RpcError) -> Self {
        match error {
            RpcError::ErrorResponse { message, .. } if is_already_known(&message) => {
                SendTransactionError::AlreadyKnown { message }
            }
            RpcError::ErrorResponse { message, .. } => SendTransactionError::Rejected { message },
            other => SendTransactionError::SendFailed { source: other },
        }
    }

    /// Returns `true` when the transaction may have been accepted and must be
    /// reconciled through the indexer.
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self,
            SendTransactionError::ReceiptTimeout { .. }
                | SendTransactionError::ReceiptLookup { .. }
                | SendTransactionError::SendFailed { .. }
                | SendTransactionError::AlreadyKnown { .. }
        )
    }

    /// Returns `true` when the transaction definitely never reached the ledger.
    pub fn rejected_before_send(&self) -> bool {
        matches!(
            self,
            SendTransactionError::InvalidKey { .. }
                | SendTransactionError::SignerMismatch { .. }
                | SendTransactionError::Signing { .. }
                | SendTransactionError::Preparation { .. }
                | SendTransactionError::Rejected { .. }
        )
    }

    /// Returns `true` when the node reported a nonce collision.
    pub fn is_nonce_collision(&self) -> bool {
        match self {
            SendTransactionError::Rejected { message } => {
                message.contains("nonce too low") || message.contains("nonce too high")
            }
            _ => false,
        }
    }
}

/// Pool replies meaning the same signed transaction was accepted earlier.
fn is_already_known(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["already known", "known transaction", "already imported"]
        .iter()
        .any(|needle| message.contains(needle))
}

/// The single error type returned by every write operation.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The contract reverted; never retried.
    #[error("Contract reverted: {0}")]
    ContractRevert(#[from] ContractRevert),

    /// Signing, sending, or confirming the transaction failed.
    #[error("Send transaction error: {0}")]
    Send(#[from] SendTransactionError),

    /// The request was rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl TransactionError {
    /// Returns the decoded revert, if this is a contract revert.
    pub fn as_revert(&self) -> Option<&ContractRevert> {
        match self {
            TransactionError::ContractRevert(revert) => Some(revert),
            _ => None,
        }
    }

    /// Returns the send-side error, if this is one.
    pub fn as_send_error(&self) -> Option<&SendTransactionError> {
        match self {
            TransactionError::Send(err) => Some(err),
            _ => None,
        }
    }
}
