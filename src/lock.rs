// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Locked balances
//!
//! A lock moves part of an account's free balance under a lock address
//! (typically an exchange or escrow agent). The contract keeps the
//! invariant `free + Σ locked == issued` per account and rejects any unlock
//! or account change larger than the locked amount; such a rejection comes
//! back as a [`ContractRevert`](crate::ContractRevert) and leaves the locked
//! amount unchanged.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{info, Instrument};

use crate::contracts::ISecurityToken;
use crate::errors::{ReadError, TransactionError};
use crate::params::{ForceChangeLockedAccountParams, ForceLockParams, ForceUnlockParams, LockParams};
use crate::reader::ContractReader;
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TransactionSubmitter, TxOutcome};

/// Lock family writes and the `lockedOf` read.
#[derive(Debug, Clone)]
pub struct LockLedger {
    submitter: Arc<TransactionSubmitter>,
}

impl LockLedger {
    pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
        Self { submitter }
    }

    /// Locks `value` of the signer's own free balance under `lock_address`.
    pub async fn lock(
        &self,
        token_address: Address,
        params: &LockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let call = ISecurityToken::lockCall {
            lockAddress: params.lock_address,
            value: params.value,
            data: params.data.clone(),
        };
        let call = ContractCall::new(token_address, &call);
        self.submit("lock", token_address, params.lock_address, call, signer)
            .await
    }

    /// Locks `value` of `account_address`'s free balance; issuer only.
    pub async fn force_lock(
        &self,
        token_address: Address,
        params: &ForceLockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let call = ISecurityToken::forceLockCall {
            lockAddress: params.lock_address,
            accountAddress: params.account_address,
            value: params.value,
            data: params.data.clone(),
        };
        let call = ContractCall::new(token_address, &call);
        self.submit("force_lock", token_address, params.lock_address, call, signer)
            .await
    }

    /// Releases `value` locked for `account_address` to the recipient's free balance.
    pub async fn force_unlock(
        &self,
        token_address: Address,
        params: &ForceUnlockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let call = ISecurityToken::forceUnlockCall {
            lockAddress: params.lock_address,
            accountAddress: params.account_address,
            recipientAddress: params.recipient_address,
            value: params.value,
            data: params.data.clone(),
        };
        let call = ContractCall::new(token_address, &call);
        self.submit("force_unlock", token_address, params.lock_address, call, signer)
            .await
    }

    /// Moves `value` locked under `lock_address` from one account to another.
    ///
    /// The amount stays locked throughout; it never passes through a free balance.
    pub async fn force_change_locked_account(
        &self,
        token_address: Address,
        params: &ForceChangeLockedAccountParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let call = ISecurityToken::forceChangeLockedAccountCall {
            lockAddress: params.lock_address,
            beforeAccountAddress: params.before_account_address,
            afterAccountAddress: params.after_account_address,
            value: params.value,
            data: params.data.clone(),
        };
        self.submit(
            "force_change_locked_account",
            token_address,
            params.lock_address,
            ContractCall::new(token_address, &call),
            signer,
        )
        .await
    }

    /// Amount of `account_address`'s balance locked under `lock_address`.
    ///
    /// A reverting getter reads as zero.
    pub async fn locked_amount(
        &self,
        token_address: Address,
        lock_address: Address,
        account_address: Address,
    ) -> Result<U256, ReadError> {
        let ledger = self.submitter.ledger().as_ref();
        let reader = ContractReader::new(ledger, token_address, "lockedOf", 1);
        reader
            .get_or(
                ISecurityToken::lockedOfCall {
                    lockAddress: lock_address,
                    accountAddress: account_address,
                },
                U256::ZERO,
            )
            .await
    }

    async fn submit(
        &self,
        operation: &'static str,
        token_address: Address,
        lock_address: Address,
        call: ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let span = spans::lock_operation(operation, token_address, lock_address);
        async {
            let outcome = self.submitter.submit(&call, signer).await?;
            info!(tx_hash = %outcome.tx_hash, "Lock operation mined");
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
