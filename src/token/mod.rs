// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-token handles
//!
//! [`TokenEngine`] is the process-scoped context: one ledger client, one
//! submitter, one attribute cache. It hands out lightweight handles:
//!
//! - [`BondToken`] / [`ShareToken`]: `create`, `get`, `update` for one token kind
//! - [`SecurityToken`]: the write surface every token shares (transfers,
//!   issuance, redemption, locks, transfer approvals) plus balance reads;
//!   both kind handles dereference to it
//!
//! Every successful write records an invalidation marker for the token
//! before returning, so the next `get` reflects the change.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokenops::cache::MemoryAttributeStore;
//! use tokenops::params::ForcedTransferParams;
//! use tokenops::{EngineConfig, TokenEngine, TransactionSigner};
//!
//! let engine = TokenEngine::connect(EngineConfig::from_env()?, Arc::new(MemoryAttributeStore::new()))?;
//! let bond = engine.bond(token_address);
//! let signer = TransactionSigner::from_private_key(issuer, &private_key)?;
//!
//! let outcome = bond
//!     .forced_transfer(&ForcedTransferParams { from_address: issuer, to_address: user, amount }, &signer)
//!     .await?;
//! let attributes = bond.get().await?;
//! ```

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, Instrument};

use crate::approval::{OnChainApplication, TransferApplication, TransferApprovalWorkflow};
use crate::attributes::{CommonAttributes, TokenKind};
use crate::bulk::BulkOperationCoordinator;
use crate::cache::{AttributeStore, TokenAttributeCache};
use crate::config::constants::{ATTRIBUTE_READ_CONCURRENCY, ZERO_ADDRESS};
use crate::config::EngineConfig;
use crate::contracts::{IExchange, ISecurityToken};
use crate::errors::{EngineError, ReadError, RpcError, TransactionError, ValidationError};
use crate::ledger::LedgerClient;
use crate::lock::LockLedger;
use crate::params::{
    AdditionalIssueParams, ApproveTransferParams, CancelTransferParams,
    ForceChangeLockedAccountParams, ForceLockParams, ForceUnlockParams, ForcedTransferParams,
    LockParams, RedeemParams, TransferParams,
};
use crate::reader::ContractReader;
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TransactionSubmitter, TxOutcome};

mod bond;
mod share;

pub use bond::BondToken;
pub use share::ShareToken;

struct EngineInner {
    ledger: Arc<dyn LedgerClient>,
    submitter: Arc<TransactionSubmitter>,
    cache: TokenAttributeCache,
    bulk: BulkOperationCoordinator,
    locks: LockLedger,
    approvals: TransferApprovalWorkflow,
    config: EngineConfig,
}

/// Process-scoped context shared by all token handles.
///
/// Cloning is cheap; clones share the ledger client and cache.
#[derive(Clone)]
pub struct TokenEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for TokenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEngine")
            .field("endpoint", &self.inner.ledger.endpoint())
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl TokenEngine {
    /// Creates an engine over an existing ledger client and attribute store.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn AttributeStore>,
        config: EngineConfig,
    ) -> Self {
        let submitter = Arc::new(TransactionSubmitter::new(
            ledger.clone(),
            config.transaction.clone(),
        ));
        let inner = EngineInner {
            cache: TokenAttributeCache::new(store, config.cache.clone()),
            bulk: BulkOperationCoordinator::new(submitter.clone()),
            locks: LockLedger::new(submitter.clone()),
            approvals: TransferApprovalWorkflow::new(submitter.clone()),
            ledger,
            submitter,
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Connects to the configured endpoints and creates an engine.
    pub fn connect(config: EngineConfig, store: Arc<dyn AttributeStore>) -> Result<Self, RpcError> {
        let ledger = crate::provider::connect_ledger(&config.ledger)?;
        info!(endpoint = %ledger.endpoint(), store = store.name(), "Token engine connected");
        Ok(Self::new(ledger, store, config))
    }

    /// Handle for the bond at `token_address`; the zero address for an undeployed bond.
    pub fn bond(&self, token_address: Address) -> BondToken {
        BondToken::new(self.token(token_address, TokenKind::Bond))
    }

    /// Handle for the share at `token_address`; the zero address for an undeployed share.
    pub fn share(&self, token_address: Address) -> ShareToken {
        ShareToken::new(self.token(token_address, TokenKind::Share))
    }

    pub fn cache(&self) -> &TokenAttributeCache {
        &self.inner.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.inner.ledger
    }

    pub fn submitter(&self) -> &TransactionSubmitter {
        &self.inner.submitter
    }

    fn token(&self, token_address: Address, kind: TokenKind) -> SecurityToken {
        SecurityToken {
            token_address,
            kind,
            engine: self.clone(),
        }
    }
}

/// Write surface and balance reads shared by every token kind.
#[derive(Debug, Clone)]
pub struct SecurityToken {
    token_address: Address,
    kind: TokenKind,
    engine: TokenEngine,
}

impl SecurityToken {
    pub fn address(&self) -> Address {
        self.token_address
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is_deployed(&self) -> bool {
        self.token_address != ZERO_ADDRESS
    }

    pub fn engine(&self) -> &TokenEngine {
        &self.engine
    }

    /// Moves `amount` between two accounts on the issuer's authority.
    pub async fn forced_transfer(
        &self,
        params: &ForcedTransferParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let token_address = self.deployed()?;
        let call = ISecurityToken::transferFromCall {
            from: params.from_address,
            to: params.to_address,
            value: params.amount,
        };
        self.write("forced_transfer", ContractCall::new(token_address, &call), signer)
            .await
    }

    /// Applies all forced transfers in one transaction, or none.
    pub async fn bulk_forced_transfer(
        &self,
        items: &[ForcedTransferParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .bulk
            .forced_transfer(token_address, items, signer)
            .await;
        self.after_write(result).await
    }

    /// Transfers from the signer to every recipient in one transaction, or none.
    pub async fn bulk_transfer(
        &self,
        items: &[TransferParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .bulk
            .transfer(token_address, items, signer)
            .await;
        self.after_write(result).await
    }

    /// Issues `amount` to the account's free balance.
    pub async fn additional_issue(
        &self,
        params: &AdditionalIssueParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let token_address = self.deployed()?;
        let call = ISecurityToken::issueFromCall {
            targetAddress: params.account_address,
            lockAddress: ZERO_ADDRESS,
            amount: params.amount,
        };
        self.write("additional_issue", ContractCall::new(token_address, &call), signer)
            .await
    }

    /// Issues to every account in one transaction, or none.
    pub async fn bulk_additional_issue(
        &self,
        items: &[AdditionalIssueParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .bulk
            .additional_issue(token_address, items, signer)
            .await;
        self.after_write(result).await
    }

    /// Redeems `amount` from the account's free balance.
    pub async fn redeem(
        &self,
        params: &RedeemParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        params.validate()?;
        let token_address = self.deployed()?;
        let call = ISecurityToken::redeemFromCall {
            targetAddress: params.account_address,
            lockAddress: ZERO_ADDRESS,
            amount: params.amount,
        };
        self.write("redeem", ContractCall::new(token_address, &call), signer)
            .await
    }

    /// Redeems from every account in one transaction, or none.
    pub async fn bulk_redeem(
        &self,
        items: &[RedeemParams],
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .bulk
            .redeem(token_address, items, signer)
            .await;
        self.after_write(result).await
    }

    pub async fn lock(
        &self,
        params: &LockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self.engine.inner.locks.lock(token_address, params, signer).await;
        self.after_write(result).await
    }

    pub async fn force_lock(
        &self,
        params: &ForceLockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .locks
            .force_lock(token_address, params, signer)
            .await;
        self.after_write(result).await
    }

    pub async fn force_unlock(
        &self,
        params: &ForceUnlockParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .locks
            .force_unlock(token_address, params, signer)
            .await;
        self.after_write(result).await
    }

    pub async fn force_change_locked_account(
        &self,
        params: &ForceChangeLockedAccountParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .locks
            .force_change_locked_account(token_address, params, signer)
            .await;
        self.after_write(result).await
    }

    /// Approves a pending transfer application by id.
    ///
    /// An application that is already approved or cancelled, or does not
    /// exist, fails with the contract's "Application is invalid." revert.
    pub async fn approve_transfer(
        &self,
        params: &ApproveTransferParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .approvals
            .approve_transfer(token_address, params, signer)
            .await;
        self.after_write(result).await
    }

    /// Cancels a pending transfer application by id.
    pub async fn cancel_transfer(
        &self,
        params: &CancelTransferParams,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let token_address = self.deployed()?;
        let result = self
            .engine
            .inner
            .approvals
            .cancel_transfer(token_address, params, signer)
            .await;
        self.after_write(result).await
    }

    /// Approves a mirrored application, routing exchange applications to escrow.
    pub async fn approve_application(
        &self,
        application: &mut TransferApplication,
        data: &str,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, EngineError> {
        self.check_application(application)?;
        let outcome = self
            .engine
            .inner
            .approvals
            .approve_application(application, data, signer)
            .await?;
        self.engine.cache().invalidate_after_write(self.token_address).await;
        Ok(outcome)
    }

    /// Cancels a mirrored direct application.
    pub async fn cancel_application(
        &self,
        application: &mut TransferApplication,
        data: &str,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, EngineError> {
        self.check_application(application)?;
        let outcome = self
            .engine
            .inner
            .approvals
            .cancel_application(application, data, signer)
            .await?;
        self.engine.cache().invalidate_after_write(self.token_address).await;
        Ok(outcome)
    }

    /// Balance of `account_address`, including what it holds on the token's exchange.
    ///
    /// When a tradable exchange is configured, the exchange's balance and
    /// commitment for the account are added to the token balance.
    pub async fn get_account_balance(&self, account_address: Address) -> Result<U256, ReadError> {
        if !self.is_deployed() {
            return Ok(U256::ZERO);
        }
        let span = spans::get_account_balance(self.token_address, account_address);
        async {
            let ledger = self.engine.ledger().as_ref();
            let token = ContractReader::new(ledger, self.token_address, "balanceOf", 2);
            let (balance, exchange) = futures::try_join!(
                token.get_or(ISecurityToken::balanceOfCall { account: account_address }, U256::ZERO),
                token.get_or(ISecurityToken::tradableExchangeCall {}, ZERO_ADDRESS),
            )?;
            if exchange == ZERO_ADDRESS {
                return Ok(balance);
            }

            let exchange_reader = ContractReader::new(ledger, exchange, "exchange balance", 2);
            let (exchange_balance, commitment) = futures::try_join!(
                exchange_reader.get_or(
                    IExchange::balanceOfCall {
                        account: account_address,
                        token: self.token_address,
                    },
                    U256::ZERO,
                ),
                exchange_reader.get_or(
                    IExchange::commitmentOfCall {
                        account: account_address,
                        token: self.token_address,
                    },
                    U256::ZERO,
                ),
            )?;
            debug!(%balance, %exchange_balance, %commitment, "Account balance components");
            Ok(balance
                .saturating_add(exchange_balance)
                .saturating_add(commitment))
        }
        .instrument(span)
        .await
    }

    /// Amount of `account_address`'s balance locked under `lock_address`.
    pub async fn get_locked_amount(
        &self,
        lock_address: Address,
        account_address: Address,
    ) -> Result<U256, ReadError> {
        if !self.is_deployed() {
            return Ok(U256::ZERO);
        }
        self.engine
            .inner
            .locks
            .locked_amount(self.token_address, lock_address, account_address)
            .await
    }

    /// Application `application_id` as the contract reports it.
    pub async fn get_transfer_application(
        &self,
        application_id: U256,
    ) -> Result<Option<OnChainApplication>, ReadError> {
        if !self.is_deployed() {
            return Ok(None);
        }
        self.engine
            .inner
            .approvals
            .application(self.token_address, application_id)
            .await
    }

    pub(crate) fn deployed(&self) -> Result<Address, ValidationError> {
        if !self.is_deployed() {
            return Err(ValidationError::NotDeployed);
        }
        Ok(self.token_address)
    }

    /// Submits a single-item write and records a marker on success.
    pub(crate) async fn write(
        &self,
        operation: &'static str,
        call: ContractCall,
        signer: &TransactionSigner,
    ) -> Result<TxOutcome, TransactionError> {
        let span = spans::token_write(operation, self.token_address);
        let result = self
            .engine
            .submitter()
            .submit(&call, signer)
            .instrument(span)
            .await;
        self.after_write(result).await
    }

    async fn after_write(
        &self,
        result: Result<TxOutcome, TransactionError>,
    ) -> Result<TxOutcome, TransactionError> {
        if result.is_ok() {
            self.engine
                .cache()
                .invalidate_after_write(self.token_address)
                .await;
        }
        result
    }

    fn check_application(&self, application: &TransferApplication) -> Result<(), TransactionError> {
        self.deployed()?;
        if application.token_address != self.token_address {
            return Err(ValidationError::invalid_field(
                "token_address",
                format!(
                    "application belongs to {}, not {}",
                    application.token_address, self.token_address
                ),
            )
            .into());
        }
        Ok(())
    }
}

/// Reads the attributes every token kind shares.
pub(crate) async fn fetch_common(
    reader: &ContractReader<'_>,
    token_address: Address,
) -> Result<CommonAttributes, ReadError> {
    let defaults = CommonAttributes::empty(token_address);
    let (
        owner_address,
        name,
        symbol,
        total_supply,
        tradable_exchange_contract_address,
        contact_information,
        privacy_policy,
        status,
    ) = futures::try_join!(
        reader.get_or(ISecurityToken::ownerCall {}, defaults.owner_address),
        reader.get_or(ISecurityToken::nameCall {}, defaults.name.clone()),
        reader.get_or(ISecurityToken::symbolCall {}, defaults.symbol.clone()),
        reader.get_or(ISecurityToken::totalSupplyCall {}, defaults.total_supply),
        reader.get_or(
            ISecurityToken::tradableExchangeCall {},
            defaults.tradable_exchange_contract_address
        ),
        reader.get_or(
            ISecurityToken::contactInformationCall {},
            defaults.contact_information.clone()
        ),
        reader.get_or(ISecurityToken::privacyPolicyCall {}, defaults.privacy_policy.clone()),
        reader.get_or(ISecurityToken::statusCall {}, defaults.status),
    )?;
    let (
        personal_info_contract_address,
        require_personal_info_registered,
        transferable,
        is_offering,
        transfer_approval_required,
        memo,
    ) = futures::try_join!(
        reader.get_or(
            ISecurityToken::personalInfoAddressCall {},
            defaults.personal_info_contract_address
        ),
        reader.get_or(
            ISecurityToken::requirePersonalInfoRegisteredCall {},
            defaults.require_personal_info_registered
        ),
        reader.get_or(ISecurityToken::transferableCall {}, defaults.transferable),
        reader.get_or(ISecurityToken::isOfferingCall {}, defaults.is_offering),
        reader.get_or(
            ISecurityToken::transferApprovalRequiredCall {},
            defaults.transfer_approval_required
        ),
        reader.get_or(ISecurityToken::memoCall {}, defaults.memo.clone()),
    )?;

    Ok(CommonAttributes {
        token_address,
        owner_address,
        name,
        symbol,
        total_supply,
        tradable_exchange_contract_address,
        contact_information,
        privacy_policy,
        status,
        personal_info_contract_address,
        require_personal_info_registered,
        transferable,
        is_offering,
        transfer_approval_required,
        memo,
    })
}

/// Reader for one token's attribute getters.
pub(crate) fn attribute_reader(engine: &TokenEngine, token_address: Address) -> ContractReader<'_> {
    ContractReader::new(
        engine.ledger().as_ref(),
        token_address,
        "attributes",
        ATTRIBUTE_READ_CONCURRENCY,
    )
}

/// Applies setter calls in order, stopping at the first failure.
///
/// A marker is recorded if at least one setter succeeded, including when a
/// later one failed.
pub(crate) async fn apply_setters(
    token: &SecurityToken,
    calls: Vec<ContractCall>,
    signer: &TransactionSigner,
) -> Result<Vec<TxOutcome>, TransactionError> {
    let span = spans::update_token(token.kind, token.token_address, calls.len());
    async {
        let mut outcomes = Vec::with_capacity(calls.len());
        let mut failure = None;
        for call in &calls {
            match token.engine.submitter().submit(call, signer).await {
                Ok(outcome) => {
                    debug!(setter = call.label, tx_hash = %outcome.tx_hash, "Setter applied");
                    outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::warn!(
                        setter = call.label,
                        applied = outcomes.len(),
                        remaining = calls.len() - outcomes.len(),
                        error = %e,
                        "Update stopped at failing setter"
                    );
                    failure = Some(e);
                    break;
                }
            }
        }

        if !outcomes.is_empty() {
            token
                .engine
                .cache()
                .invalidate_after_write(token.token_address)
                .await;
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }
    .instrument(span)
    .await
}
