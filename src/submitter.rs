// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Single transaction submission
//!
//! [`TransactionSubmitter::submit`] runs one contract call through the full
//! write path:
//!
//! 1. Build: nonce from the sender account, chain id, gas limit, gas price
//! 2. Simulate with `eth_call`; a revert is decoded and returned without sending
//! 3. Sign locally with the caller's key
//! 4. Send and poll for the receipt within the configured window
//! 5. A failed receipt is replayed against the parent block to recover the
//!    revert reason
//!
//! Writes are never retried here. A receipt timeout means the outcome is
//! unknown, not that the transaction failed.

use std::sync::Arc;

use alloy_consensus::TxLegacy;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy_rpc_types::{BlockId, TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::config::TransactionConfig;
use crate::errors::{ContractRevert, SendTransactionError, TransactionError};
use crate::ledger::{CallOutcome, LedgerClient, Receipt};
use crate::revert::RevertReason;
use crate::signer::TransactionSigner;
use crate::spans;

/// A built contract call, not yet bound to a sender or nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Target contract; `None` deploys `input` as init code
    pub to: Option<Address>,
    /// ABI-encoded call data (or init code plus constructor arguments)
    pub input: Bytes,
    /// Function signature or operation name, for logs
    pub label: &'static str,
}

impl ContractCall {
    /// Encodes `call` against the contract at `to`.
    pub fn new<C: SolCall>(to: Address, call: &C) -> Self {
        Self {
            to: Some(to),
            input: call.abi_encode().into(),
            label: C::SIGNATURE,
        }
    }

    /// Deployment of `bytecode` with ABI-encoded `constructor_args` appended.
    pub fn deploy(bytecode: &[u8], constructor_args: &[u8]) -> Self {
        let mut input = Vec::with_capacity(bytecode.len() + constructor_args.len());
        input.extend_from_slice(bytecode);
        input.extend_from_slice(constructor_args);
        Self {
            to: None,
            input: input.into(),
            label: "deploy",
        }
    }

    fn request(&self, from: Address, gas_limit: u64) -> TransactionRequest {
        let request = TransactionRequest::default()
            .from(from)
            .gas_limit(gas_limit)
            .input(TransactionInput::new(self.input.clone()));
        match self.to {
            Some(to) => request.to(to),
            None => request.into_create(),
        }
    }
}

/// Result of a mined, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Receipt with a success status
    pub receipt: Receipt,
}

/// Builds, simulates, signs, sends, and confirms transactions.
#[derive(Clone)]
pub struct TransactionSubmitter {
    ledger: Arc<dyn LedgerClient>,
    config: TransactionConfig,
}

impl std::fmt::Debug for TransactionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSubmitter")
            .field("endpoint", &self.ledger.endpoint())
            .field("config", &self.config)
            .finish()
    }
}

impl TransactionSubmitter {
    /// Creates a submitter over `ledger`.
    pub fn new(ledger: Arc<dyn LedgerClient>, config: TransactionConfig) -> Self {
        Self { ledger, config }
    }

    /// The ledger client used for submission.
    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// The transaction parameters attached to every submission.
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Submits `call` signed by `signer` and waits for its receipt.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::ContractRevert`] if simulation reverts or the mined
    ///   transaction failed with a recoverable reason
    /// - [`TransactionError::Send`] for every other failure; see
    ///   [`SendTransactionError::outcome_unknown`]
    pub async fn submit(
        &self,
        call: &ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let span = spans::submit_transaction(call.label, call.to, signer.address());
        self.submit_inner(call, signer).instrument(span).await
    }

    /// Deploys a contract and returns its address with the outcome.
    pub async fn deploy(
        &self,
        call: &ContractCall,
        signer: &TransactionSigner,
    ) -> Result<(Address, TxOutcome), TransactionError> {
        let outcome = self.submit(call, signer).await?;
        let address = outcome.receipt.contract_address.ok_or(
            SendTransactionError::MissingContractAddress {
                tx_hash: outcome.tx_hash,
            },
        )?;
        info!(contract_address = %address, tx_hash = %outcome.tx_hash, "Contract deployed");
        Ok((address, outcome))
    }

    async fn submit_inner(
        &self,
        call: &ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let from = signer.address();
        let request = call.request(from, self.config.gas_limit);

        let nonce = self
            .ledger
            .transaction_count(from)
            .await
            .map_err(|source| SendTransactionError::Preparation {
                stage: "nonce",
                source,
            })?;

        match self.ledger.call(request.clone(), BlockId::latest()).await {
            Ok(CallOutcome::Success(_)) => {}
            Ok(CallOutcome::Reverted(raw)) => {
                let revert = ContractRevert::from(RevertReason::parse(&raw));
                warn!(code = ?revert.code, message = %revert.message, "Simulation reverted");
                return Err(revert.into());
            }
            Err(source) => {
                return Err(SendTransactionError::Preparation {
                    stage: "simulation",
                    source,
                }
                .into())
            }
        }

        let tx = TxLegacy {
            chain_id: Some(self.config.chain_id),
            nonce,
            gas_price: self.config.gas_price,
            gas_limit: self.config.gas_limit,
            to: call.to.map_or(TxKind::Create, TxKind::Call),
            value: U256::ZERO,
            input: call.input.clone(),
        };
        let signed = signer.sign(tx)?;

        let tx_hash = match self.ledger.send_raw_transaction(signed.encoded).await {
            Ok(tx_hash) => tx_hash,
            Err(err) => match SendTransactionError::from_send_failure(err) {
                SendTransactionError::AlreadyKnown { message } => {
                    warn!(tx_hash = %signed.hash, message = %message, "Node already holds the transaction");
                    signed.hash
                }
                other => return Err(other.into()),
            },
        };
        if tx_hash != signed.hash {
            warn!(returned = %tx_hash, computed = %signed.hash, "Node returned an unexpected transaction hash");
        }
        debug!(tx_hash = %tx_hash, nonce, "Transaction sent");

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.status {
            return Err(self.inspect_failure(request, &receipt).await);
        }

        info!(
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction mined"
        );
        Ok(TxOutcome { tx_hash, receipt })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, SendTransactionError> {
        let poll = async {
            loop {
                match self.ledger.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => tokio::time::sleep(self.config.receipt_poll_interval).await,
                    Err(source) => {
                        return Err(SendTransactionError::ReceiptLookup { tx_hash, source })
                    }
                }
            }
        };

        match tokio::time::timeout(self.config.receipt_timeout, poll).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tx_hash = %tx_hash, timeout = ?self.config.receipt_timeout, "Receipt wait timed out");
                Err(SendTransactionError::ReceiptTimeout {
                    tx_hash,
                    timeout: self.config.receipt_timeout,
                })
            }
        }
    }

    /// Replays a failed transaction against the state before its block.
    async fn inspect_failure(&self, request: TransactionRequest, receipt: &Receipt) -> TransactionError {
        let block = BlockId::number(receipt.block_number.saturating_sub(1));
        match self.ledger.call(request, block).await {
            Ok(CallOutcome::Reverted(raw)) => {
                let revert = ContractRevert::from(RevertReason::parse(&raw));
                warn!(
                    tx_hash = %receipt.transaction_hash,
                    code = ?revert.code,
                    message = %revert.message,
                    "Transaction reverted on chain"
                );
                revert.into()
            }
            Ok(CallOutcome::Success(_)) => SendTransactionError::ReceiptFailed {
                tx_hash: receipt.transaction_hash,
            }
            .into(),
            Err(err) => {
                warn!(tx_hash = %receipt.transaction_hash, error = %err, "Failed to replay reverted transaction");
                SendTransactionError::ReceiptFailed {
                    tx_hash: receipt.transaction_hash,
                }
                .into()
            }
        }
    }
}
