// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Columnar bulk writes
//!
//! A bulk operation turns N uniform intents into one contract call whose
//! arguments are parallel arrays, then submits it as a single transaction.
//! The contract applies all items or none; a failure is reported once for
//! the whole batch.
//!
//! The mapping functions ([`forced_transfer_columns`], [`transfer_columns`],
//! [`issue_columns`], [`redeem_columns`]) validate every item before building
//! the call, so an empty or malformed batch never reaches the network.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{info, Instrument};

use crate::config::constants::ZERO_ADDRESS;
use crate::contracts::ISecurityToken;
use crate::errors::{TransactionError, ValidationError};
use crate::params::{AdditionalIssueParams, ForcedTransferParams, RedeemParams, TransferParams};
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TransactionSubmitter, TxOutcome};

fn non_empty<T>(operation: &'static str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyBatch { operation });
    }
    Ok(())
}

/// Maps forced transfers to `bulkTransferFrom(fromList, toList, valueList)`.
pub fn forced_transfer_columns(
    items: &[ForcedTransferParams],
) -> Result<ISecurityToken::bulkTransferFromCall, ValidationError> {
    non_empty("bulk_forced_transfer", items)?;
    for item in items {
        item.validate()?;
    }
    Ok(ISecurityToken::bulkTransferFromCall {
        fromList: items.iter().map(|item| item.from_address).collect(),
        toList: items.iter().map(|item| item.to_address).collect(),
        valueList: items.iter().map(|item| item.amount).collect(),
    })
}

/// Maps transfers from the sender to `bulkTransfer(toList, valueList)`.
pub fn transfer_columns(
    items: &[TransferParams],
) -> Result<ISecurityToken::bulkTransferCall, ValidationError> {
    non_empty("bulk_transfer", items)?;
    for item in items {
        item.validate()?;
    }
    Ok(ISecurityToken::bulkTransferCall {
        toList: items.iter().map(|item| item.to_address).collect(),
        valueList: items.iter().map(|item| item.amount).collect(),
    })
}

/// Maps issuances to `bulkIssueFrom`, crediting free balances (zero lock address).
pub fn issue_columns(
    items: &[AdditionalIssueParams],
) -> Result<ISecurityToken::bulkIssueFromCall, ValidationError> {
    non_empty("bulk_additional_issue", items)?;
    for item in items {
        item.validate()?;
    }
    Ok(ISecurityToken::bulkIssueFromCall {
        targetAddressList: items.iter().map(|item| item.account_address).collect(),
        lockAddressList: vec![ZERO_ADDRESS; items.len()],
        amounts: items.iter().map(|item| item.amount).collect(),
    })
}

/// Maps redemptions to `bulkRedeemFrom`, debiting free balances (zero lock address).
pub fn redeem_columns(
    items: &[RedeemParams],
) -> Result<ISecurityToken::bulkRedeemFromCall, ValidationError> {
    non_empty("bulk_redeem", items)?;
    for item in items {
        item.validate()?;
    }
    Ok(ISecurityToken::bulkRedeemFromCall {
        targetAddressList: items.iter().map(|item| item.account_address).collect(),
        lockAddressList: vec![ZERO_ADDRESS; items.len()],
        amounts: items.iter().map(|item| item.amount).collect(),
    })
}

/// Zips caller-supplied columns into transfer intents.
///
/// # Errors
///
/// [`ValidationError::ColumnLengthMismatch`] if the columns differ in length.
pub fn transfers_from_columns(
    to_addresses: Vec<Address>,
    amounts: Vec<U256>,
) -> Result<Vec<TransferParams>, ValidationError> {
    if to_addresses.len() != amounts.len() {
        return Err(ValidationError::ColumnLengthMismatch {
            operation: "bulk_transfer",
            left: to_addresses.len(),
            right: amounts.len(),
        });
    }
    Ok(to_addresses
        .into_iter()
        .zip(amounts)
        .map(|(to_address, amount)| TransferParams { to_address, amount })
        .collect())
}

/// Submits columnar bulk calls as single transactions.
#[derive(Debug, Clone)]
pub struct BulkOperationCoordinator {
    submitter: Arc<TransactionSubmitter>,
}

impl BulkOperationCoordinator {
    pub fn new(submitter: Arc<TransactionSubmitter>) -> Self {
        Self { submitter }
    }

    /// One `bulkTransferFrom` transaction for all `items`.
    pub async fn forced_transfer(
        &self,
        token_address: Address,
        items: &[ForcedTransferParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ContractCall::new(token_address, &forced_transfer_columns(items)?);
        self.submit("bulk_forced_transfer", token_address, items.len(), call, signer)
            .await
    }

    /// One `bulkTransfer` transaction for all `items`.
    pub async fn transfer(
        &self,
        token_address: Address,
        items: &[TransferParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ContractCall::new(token_address, &transfer_columns(items)?);
        self.submit("bulk_transfer", token_address, items.len(), call, signer)
            .await
    }

    /// One `bulkIssueFrom` transaction for all `items`.
    pub async fn additional_issue(
        &self,
        token_address: Address,
        items: &[AdditionalIssueParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ContractCall::new(token_address, &issue_columns(items)?);
        self.submit("bulk_additional_issue", token_address, items.len(), call, signer)
            .await
    }

    /// One `bulkRedeemFrom` transaction for all `items`.
    pub async fn redeem(
        &self,
        token_address: Address,
        items: &[RedeemParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let call = ContractCall::new(token_address, &redeem_columns(items)?);
        self.submit("bulk_redeem", token_address, items.len(), call, signer)
            .await
    }

    async fn submit(
        &self,
        operation: &'static str,
        token_address: Address,
        items: usize,
        call: ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let span = spans::bulk_operation(operation, token_address, items);
        async {
            let outcome = self.submitter.submit(&call, signer).await?;
            info!(tx_hash = %outcome.tx_hash, items, "Bulk operation mined");
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
