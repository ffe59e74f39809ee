// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer approval workflow
//!
//! Tokens that require transfer approval park each transfer as an
//! application on chain. The issuer then approves it (the transfer takes
//! effect) or cancels it (the amount returns to the sender). Both outcomes
//! are terminal:
//!
//! ```text
//! Pending ──approve_transfer──▶ Approved
//!    │
//!    └────cancel_transfer─────▶ Cancelled
//! ```
//!
//! The contract enforces the state machine and rejects a second approval or
//! cancellation with "Application is invalid.". [`TransferApplication`] is
//! the off-chain mirror of one application; it applies the same transitions
//! locally so a stale request can be refused without a round trip.
//!
//! Applications created through an exchange (`exchange_address` set) are
//! approved on the escrow contract instead of the token.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

use crate::config::constants::ZERO_ADDRESS;
use crate::contracts::{ISecurityToken, ISecurityTokenEscrow};
use crate::errors::{ApprovalStateError, EngineError, ReadError, TransactionError, ValidationError};
use crate::params::{ApproveTransferParams, CancelTransferParams};
use crate::reader::ContractReader;
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TransactionSubmitter, TxOutcome};

/// Lifecycle state of a transfer application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    Cancelled,
}

impl ApprovalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalState::Pending)
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalState::Pending => write!(f, "pending"),
            ApprovalState::Approved => write!(f, "approved"),
            ApprovalState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Off-chain record of one transfer application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferApplication {
    pub token_address: Address,
    /// Exchange the application was made through; zero for direct applications
    pub exchange_address: Address,
    /// Contract-assigned id (escrow id for exchange applications)
    pub application_id: U256,
    pub from_address: Address,
    pub to_address: Address,
    pub amount: U256,
    pub cancelled: bool,
    pub escrow_finished: bool,
    pub transfer_approved: bool,
}

impl TransferApplication {
    /// A freshly created application.
    pub fn pending(
        token_address: Address,
        exchange_address: Address,
        application_id: U256,
        from_address: Address,
        to_address: Address,
        amount: U256,
    ) -> Self {
        Self {
            token_address,
            exchange_address,
            application_id,
            from_address,
            to_address,
            amount,
            cancelled: false,
            escrow_finished: false,
            transfer_approved: false,
        }
    }

    pub fn state(&self) -> ApprovalState {
        if self.transfer_approved {
            ApprovalState::Approved
        } else if self.cancelled {
            ApprovalState::Cancelled
        } else {
            ApprovalState::Pending
        }
    }

    /// Whether approval goes through the exchange's escrow contract.
    pub fn is_escrow(&self) -> bool {
        self.exchange_address != ZERO_ADDRESS
    }

    /// Moves a pending application to `Approved`.
    pub fn mark_approved(&mut self) -> Result<(), ApprovalStateError> {
        self.ensure_pending()?;
        self.transfer_approved = true;
        Ok(())
    }

    /// Moves a pending application to `Cancelled`.
    pub fn mark_cancelled(&mut self) -> Result<(), ApprovalStateError> {
        self.ensure_pending()?;
        self.cancelled = true;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), ApprovalStateError> {
        let state = self.state();
        if state.is_terminal() {
            return Err(ApprovalStateError {
                application_id: self.application_id,
                state,
            });
        }
        Ok(())
    }
}

/// An application as the token contract reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainApplication {
    pub application_id: U256,
    pub from_address: Address,
    pub to_address: Address,
    pub amount: U256,
    /// `false` once approved or cancelled
    pub valid: bool,
}

/// Approve and cancel paths for transfer applications.
#[derive(Debug, Clone)]
pub struct TransferApprovalWorkflow {
    submitter: Arc<TransactionSubmitter>,
}

impl TransferApprovalWorkflow {
    pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
        Self { submitter }
    }

    /// Approves application `params.application_id` on the token contract.
    pub async fn approve_transfer(
        &self,
        token_address: Address,
        params: &ApproveTransferParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ISecurityToken::approveTransferCall {
            index: params.application_id,
            data: params.data.clone(),
        };
        let call = ContractCall::new(token_address, &call);
        self.submit("approve_transfer", token_address, params.application_id, call, signer)
            .await
    }

    /// Cancels application `params.application_id` on the token contract.
    pub async fn cancel_transfer(
        &self,
        token_address: Address,
        params: &CancelTransferParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ISecurityToken::cancelTransferCall {
            index: params.application_id,
            data: params.data.clone(),
        };
        let call = ContractCall::new(token_address, &call);
        self.submit("cancel_transfer", token_address, params.application_id, call, signer)
            .await
    }

    /// Approves a mirrored application and updates the mirror on success.
    ///
    /// Exchange applications are approved on the escrow contract. A mirror
    /// that is already terminal is refused without any network call.
    pub async fn approve_application(
        &self,
        application: &mut TransferApplication,
        data: &str,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, EngineError> {
        application.ensure_pending()?;

        let outcome = if application.is_escrow() {
            let call = ISecurityTokenEscrow::approveTransferCall {
                escrowId: application.application_id,
                data: data.to_string(),
            };
            let call = ContractCall::new(application.exchange_address, &call);
            self.submit(
                "approve_escrow_transfer",
                application.token_address,
                application.application_id,
                call,
                signer,
            )
            .await?
        } else {
            let params = ApproveTransferParams {
                application_id: application.application_id,
                data: data.to_string(),
            };
            self.approve_transfer(application.token_address, &params, signer)
                .await?
        };

        application.mark_approved()?;
        Ok(outcome)
    }

    /// Cancels a mirrored application and updates the mirror on success.
    ///
    /// Exchange applications cannot be cancelled by the issuer.
    pub async fn cancel_application(
        &self,
        application: &mut TransferApplication,
        data: &str,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, EngineError> {
        application.ensure_pending()?;
        if application.is_escrow() {
            return Err(TransactionError::from(ValidationError::Unsupported(
                "cancellation of an exchange transfer application".to_string(),
            ))
            .into());
        }

        let params = CancelTransferParams {
            application_id: application.application_id,
            data: data.to_string(),
        };
        let outcome = self
            .cancel_transfer(application.token_address, &params, signer)
            .await?;

        application.mark_cancelled()?;
        Ok(outcome)
    }

    /// Reads application `application_id` from the token contract.
    ///
    /// `None` if the getter reverts (no such application).
    pub async fn application(
        &self,
        token_address: Address,
        application_id: U256,
    ) -> Result<Option<OnChainApplication>, ReadError> {
        let ledger = self.submitter.ledger().as_ref();
        let reader = ContractReader::new(ledger, token_address, "applicationsForTransfer", 1);
        let application = reader
            .get(ISecurityToken::applicationsForTransferCall {
                index: application_id,
            })
            .await?;
        Ok(application.map(|ret| OnChainApplication {
            application_id,
            from_address: ret.from,
            to_address: ret.to,
            amount: ret.amount,
            valid: ret.valid,
        }))
    }

    async fn submit(
        &self,
        operation: &'static str,
        token_address: Address,
        application_id: U256,
        call: ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let span = spans::transfer_approval(operation, token_address, application_id);
        async {
            match self.submitter.submit(&call, signer).await {
                Ok(outcome) => {
                    info!(tx_hash = %outcome.tx_hash, "Transfer application settled");
                    Ok(outcome)
                }
                Err(e) => {
                    warn!(error = %e, "Transfer application update failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
