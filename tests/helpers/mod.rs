// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for tokenops integration tests
//!
//! [`MockLedger`] implements `LedgerClient` with an in-memory chain that
//! runs a simplified security token contract. It decodes the same `sol!`
//! calls the engine encodes, recovers the signer from raw transactions, and
//! keeps balances, locks, transfer applications, nonces, and receipts.
//!
//! Revert codes follow the token contracts: shares use the `11xxxx` range,
//! bonds `12xxxx`.
//!
//! # Example
//!
//! ```rust,ignore
//! let ledger = MockLedger::new();
//! let token = ledger.deploy_bond(ISSUER, U256::from(10_000));
//! let (engine, _store) = engine(ledger.clone(), true);
//!
//! engine.bond(token).forced_transfer(&params, &issuer_signer()).await?;
//! assert_eq!(ledger.balance_of(token, USER), U256::from(10));
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy_consensus::transaction::SignerRecoverable;
use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{address, hex, Address, Bytes, TxHash, TxKind, B256, U256};
use alloy_rpc_types::{BlockId, TransactionRequest};
use alloy_sol_types::{SolCall, SolInterface, SolValue};
use async_trait::async_trait;
use tokenops::cache::MemoryAttributeStore;
use tokenops::contracts::{IExchange, IShare, ISecurityToken, ISecurityTokenEscrow, IStraightBond};
use tokenops::{
    CallOutcome, EngineConfig, LedgerClient, Receipt, RpcError, TokenEngine, TokenKind,
    TransactionSigner,
};

pub const ISSUER_KEY: [u8; 32] =
    hex!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
pub const ISSUER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

pub const USER_KEY: [u8; 32] =
    hex!("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d");
pub const USER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub const OTHER: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
pub const LOCK_ADDRESS: Address = address!("90F79bf6EB2c4f870365E785982E1f101E93b906");
pub const EXCHANGE: Address = address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65");

/// Init code prefix the mock deploys as a straight bond.
pub const BOND_BYTECODE: &[u8] = &[0xb0, 0x0d, 0x60, 0x80];
/// Init code prefix the mock deploys as a share.
pub const SHARE_BYTECODE: &[u8] = &[0x5a, 0x4e, 0x60, 0x80];

pub fn issuer_signer() -> TransactionSigner {
    TransactionSigner::from_private_key(ISSUER, &ISSUER_KEY).expect("issuer key is valid")
}

pub fn user_signer() -> TransactionSigner {
    TransactionSigner::from_private_key(USER, &USER_KEY).expect("user key is valid")
}

/// Engine over `ledger` with a fresh memory store.
pub fn engine(ledger: Arc<MockLedger>, cache_enabled: bool) -> (TokenEngine, Arc<MemoryAttributeStore>) {
    let store = Arc::new(MemoryAttributeStore::new());
    let mut config = EngineConfig::minimal();
    config.cache.enabled = cache_enabled;
    let engine = TokenEngine::new(ledger, store.clone(), config);
    (engine, store)
}

/// Install a test subscriber once; respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockApplication {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub valid: bool,
    pub approved: bool,
}

#[derive(Debug, Clone)]
struct MockToken {
    kind: TokenKind,
    owner: Address,
    name: String,
    symbol: String,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    locked: HashMap<(Address, Address), U256>,
    applications: Vec<MockApplication>,
    tradable_exchange: Address,
    status: bool,
    transferable: bool,
    is_offering: bool,
    memo: String,
    // bond
    face_value: U256,
    face_value_currency: String,
    interest_rate: U256,
    interest_payment_date: String,
    base_fx_rate: String,
    purpose: String,
    is_redeemed: bool,
    // share
    issue_price: U256,
    principal_value: U256,
    cancellation_date: String,
    is_canceled: bool,
    dividends: (U256, String, String),
    /// Signatures of applied setters, in order
    setter_log: Vec<&'static str>,
    /// Setter signatures that revert
    rejected_setters: Vec<&'static str>,
}

impl MockToken {
    fn new(kind: TokenKind, owner: Address, name: &str, symbol: &str, total_supply: U256) -> Self {
        Self {
            kind,
            owner,
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply,
            balances: HashMap::from([(owner, total_supply)]),
            locked: HashMap::new(),
            applications: Vec::new(),
            tradable_exchange: Address::ZERO,
            status: true,
            transferable: false,
            is_offering: false,
            memo: String::new(),
            face_value: U256::ZERO,
            face_value_currency: "JPY".to_string(),
            interest_rate: U256::ZERO,
            interest_payment_date: String::new(),
            base_fx_rate: String::new(),
            purpose: String::new(),
            is_redeemed: false,
            issue_price: U256::ZERO,
            principal_value: U256::ZERO,
            cancellation_date: String::new(),
            is_canceled: false,
            dividends: (U256::ZERO, String::new(), String::new()),
            setter_log: Vec::new(),
            rejected_setters: Vec::new(),
        }
    }

    fn code_base(&self) -> u32 {
        match self.kind {
            TokenKind::Share => 110000,
            TokenKind::Bond => 120000,
        }
    }

    /// Offset of "Length of To and of Value aren't matched." in this family
    fn length_mismatch(&self) -> u32 {
        match self.kind {
            TokenKind::Share => 502,
            TokenKind::Bond => 501,
        }
    }

    fn revert(&self, offset: u32) -> String {
        format!("execution reverted: {}", self.code_base() + offset)
    }

    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn locked_of(&self, lock: Address, account: Address) -> U256 {
        self.locked.get(&(lock, account)).copied().unwrap_or_default()
    }

    fn debit(&mut self, account: Address, amount: U256, code: u32) -> Result<(), String> {
        let balance = self.balance(account);
        if balance < amount {
            return Err(self.revert(code));
        }
        self.balances.insert(account, balance - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: U256) {
        *self.balances.entry(account).or_default() += amount;
    }

    fn debit_locked(&mut self, lock: Address, account: Address, amount: U256, code: u32) -> Result<(), String> {
        let locked = self.locked_of(lock, account);
        if locked < amount {
            return Err(self.revert(code));
        }
        self.locked.insert((lock, account), locked - amount);
        Ok(())
    }

    fn credit_locked(&mut self, lock: Address, account: Address, amount: U256) {
        *self.locked.entry((lock, account)).or_default() += amount;
    }

    fn setter(&mut self, signature: &'static str) -> Result<(), String> {
        if self.rejected_setters.contains(&signature) {
            return Err("execution reverted: 500001".to_string());
        }
        self.setter_log.push(signature);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct MockExchange {
    holdings: HashMap<(Address, Address), (U256, U256)>,
    escrows: HashMap<U256, bool>,
}

#[derive(Debug, Clone, Default)]
struct Chain {
    tokens: HashMap<Address, MockToken>,
    exchanges: HashMap<Address, MockExchange>,
}

#[derive(Debug, Default)]
struct LedgerState {
    chain: Chain,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, Receipt>,
    block_number: u64,
    offline: bool,
    withhold_receipts: bool,
    front_run: Option<FrontRun>,
    fail_next_silently: bool,
    reply_already_known: bool,
}

/// A competing transfer mined in the same block, ahead of the next send.
#[derive(Debug, Clone, Copy)]
struct FrontRun {
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
}

/// In-memory ledger node for integration tests.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    calls: AtomicU32,
    sends: AtomicU32,
}

fn ret<T: SolValue>(value: T) -> Bytes {
    (value,).abi_encode_params().into()
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Places a bond directly in state, the whole supply held by `owner`.
    pub fn deploy_bond(&self, owner: Address, total_supply: U256) -> Address {
        self.insert_token(MockToken::new(TokenKind::Bond, owner, "Test Bond", "TB", total_supply))
    }

    /// Places a share directly in state, the whole supply held by `owner`.
    pub fn deploy_share(&self, owner: Address, total_supply: U256) -> Address {
        self.insert_token(MockToken::new(TokenKind::Share, owner, "Test Share", "TS", total_supply))
    }

    fn insert_token(&self, token: MockToken) -> Address {
        let mut state = self.state.lock().unwrap();
        let address = Address::with_last_byte(0x10 + state.chain.tokens.len() as u8);
        state.chain.tokens.insert(address, token);
        address
    }

    fn with_token<R>(&self, token: Address, f: impl FnOnce(&mut MockToken) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        let token = state.chain.tokens.get_mut(&token).expect("token is deployed");
        f(token)
    }

    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.with_token(token, |t| t.balance(account))
    }

    pub fn locked_of(&self, token: Address, lock: Address, account: Address) -> U256 {
        self.with_token(token, |t| t.locked_of(lock, account))
    }

    pub fn name_of(&self, token: Address) -> String {
        self.with_token(token, |t| t.name.clone())
    }

    /// Changes the name as another writer would, without a transaction.
    pub fn set_name(&self, token: Address, name: &str) {
        self.with_token(token, |t| t.name = name.to_string());
    }

    pub fn set_tradable_exchange(&self, token: Address, exchange: Address) {
        self.with_token(token, |t| t.tradable_exchange = exchange);
    }

    /// Parks `amount` of `from`'s balance in a new transfer application.
    pub fn apply_for_transfer(&self, token: Address, from: Address, to: Address, amount: U256) -> U256 {
        self.with_token(token, |t| {
            t.debit(from, amount, 701).expect("applicant holds the amount");
            t.applications.push(MockApplication {
                from,
                to,
                amount,
                valid: true,
                approved: false,
            });
            U256::from(t.applications.len() - 1)
        })
    }

    pub fn application(&self, token: Address, id: usize) -> MockApplication {
        self.with_token(token, |t| t.applications[id].clone())
    }

    pub fn setter_log(&self, token: Address) -> Vec<&'static str> {
        self.with_token(token, |t| t.setter_log.clone())
    }

    pub fn reject_setter(&self, token: Address, signature: &'static str) {
        self.with_token(token, |t| t.rejected_setters.push(signature));
    }

    pub fn set_exchange_holding(
        &self,
        exchange: Address,
        account: Address,
        token: Address,
        balance: U256,
        commitment: U256,
    ) {
        let mut state = self.state.lock().unwrap();
        state
            .chain
            .exchanges
            .entry(exchange)
            .or_default()
            .holdings
            .insert((account, token), (balance, commitment));
    }

    pub fn open_escrow(&self, exchange: Address, escrow_id: U256) {
        let mut state = self.state.lock().unwrap();
        state
            .chain
            .exchanges
            .entry(exchange)
            .or_default()
            .escrows
            .insert(escrow_id, false);
    }

    pub fn escrow_approved(&self, exchange: Address, escrow_id: U256) -> bool {
        let state = self.state.lock().unwrap();
        state.chain.exchanges[&exchange].escrows[&escrow_id]
    }

    /// Every request fails at the transport level while offline.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Transactions still execute but their receipts are never returned.
    pub fn withhold_receipts(&self, withhold: bool) {
        self.state.lock().unwrap().withhold_receipts = withhold;
    }

    /// Mines a transfer of `amount` from `from` to `to` just before the next
    /// raw transaction, after that transaction was simulated.
    pub fn front_run_transfer(&self, token: Address, from: Address, to: Address, amount: U256) {
        self.state.lock().unwrap().front_run = Some(FrontRun {
            token,
            from,
            to,
            amount,
        });
    }

    /// The next raw transaction is mined with a failed status and no state
    /// change, while replaying it still succeeds.
    pub fn fail_next_silently(&self) {
        self.state.lock().unwrap().fail_next_silently = true;
    }

    /// The next raw transaction is accepted and mined, but the node answers
    /// "already known" as if it had been submitted before.
    pub fn reply_already_known(&self) {
        self.state.lock().unwrap().reply_already_known = true;
    }

    /// Number of `eth_call` requests served.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of raw transactions received.
    pub fn sends(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }

    fn check_online(&self, operation: &str) -> Result<(), RpcError> {
        if self.state.lock().unwrap().offline {
            return Err(RpcError::chain_connection_failed(
                operation,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "mock ledger offline"),
            ));
        }
        Ok(())
    }
}

/// Executes `input` from `from` against `to`, mutating `chain` on success.
fn execute(chain: &mut Chain, from: Address, to: Address, input: &[u8]) -> Result<Bytes, String> {
    if chain.exchanges.contains_key(&to) {
        let exchange = chain.exchanges.get_mut(&to).expect("checked above");
        return execute_exchange(exchange, input);
    }
    let token = chain
        .tokens
        .get_mut(&to)
        .ok_or_else(|| "execution reverted".to_string())?;

    if let Ok(call) = ISecurityToken::ISecurityTokenCalls::abi_decode(input) {
        return execute_security_token(token, from, call);
    }
    match token.kind {
        TokenKind::Bond => match IStraightBond::IStraightBondCalls::abi_decode(input) {
            Ok(call) => execute_bond(token, call),
            Err(_) => Err("execution reverted".to_string()),
        },
        TokenKind::Share => match IShare::IShareCalls::abi_decode(input) {
            Ok(call) => execute_share(token, call),
            Err(_) => Err("execution reverted".to_string()),
        },
    }
}

fn execute_security_token(
    token: &mut MockToken,
    sender: Address,
    call: ISecurityToken::ISecurityTokenCalls,
) -> Result<Bytes, String> {
    use ISecurityToken::ISecurityTokenCalls as C;

    match call {
        C::transferFrom(c) => {
            token.debit(c.from, c.value, 601)?;
            token.credit(c.to, c.value);
            Ok(ret(true))
        }
        C::bulkTransferFrom(c) => {
            if c.fromList.len() != c.toList.len() || c.toList.len() != c.valueList.len() {
                return Err(token.revert(token.length_mismatch()));
            }
            for ((from, to), value) in c.fromList.iter().zip(&c.toList).zip(&c.valueList) {
                token.debit(*from, *value, 601)?;
                token.credit(*to, *value);
            }
            Ok(ret(true))
        }
        C::bulkTransfer(c) => {
            if c.toList.len() != c.valueList.len() {
                return Err(token.revert(token.length_mismatch()));
            }
            for (to, value) in c.toList.iter().zip(&c.valueList) {
                token.debit(sender, *value, 401)?;
                token.credit(*to, *value);
            }
            Ok(ret(true))
        }
        C::issueFrom(c) => {
            issue(token, c.targetAddress, c.lockAddress, c.amount);
            Ok(Bytes::new())
        }
        C::bulkIssueFrom(c) => {
            for ((target, lock), amount) in c
                .targetAddressList
                .iter()
                .zip(&c.lockAddressList)
                .zip(&c.amounts)
            {
                issue(token, *target, *lock, *amount);
            }
            Ok(Bytes::new())
        }
        C::redeemFrom(c) => {
            redeem(token, c.targetAddress, c.lockAddress, c.amount)?;
            Ok(Bytes::new())
        }
        C::bulkRedeemFrom(c) => {
            for ((target, lock), amount) in c
                .targetAddressList
                .iter()
                .zip(&c.lockAddressList)
                .zip(&c.amounts)
            {
                redeem(token, *target, *lock, *amount)?;
            }
            Ok(Bytes::new())
        }
        C::lock(c) => {
            if c.lockAddress == Address::ZERO {
                return Err(token.revert(1));
            }
            token.debit(sender, c.value, 2)?;
            token.credit_locked(c.lockAddress, sender, c.value);
            Ok(Bytes::new())
        }
        C::forceLock(c) => {
            token.debit(c.accountAddress, c.value, 1601)?;
            token.credit_locked(c.lockAddress, c.accountAddress, c.value);
            Ok(Bytes::new())
        }
        C::forceUnlock(c) => {
            token.debit_locked(c.lockAddress, c.accountAddress, c.value, 1201)?;
            token.credit(c.recipientAddress, c.value);
            Ok(Bytes::new())
        }
        C::forceChangeLockedAccount(c) => {
            token.debit_locked(c.lockAddress, c.beforeAccountAddress, c.value, 1701)?;
            token.credit_locked(c.lockAddress, c.afterAccountAddress, c.value);
            Ok(Bytes::new())
        }
        C::lockedOf(c) => Ok(ret(token.locked_of(c.lockAddress, c.accountAddress))),
        C::approveTransfer(c) => {
            let invalid = token.revert(902);
            let app = application_mut(token, c.index).ok_or(invalid.clone())?;
            if !app.valid {
                return Err(invalid);
            }
            app.valid = false;
            app.approved = true;
            let (to, amount) = (app.to, app.amount);
            token.credit(to, amount);
            Ok(Bytes::new())
        }
        C::cancelTransfer(c) => {
            let invalid = token.revert(802);
            let app = application_mut(token, c.index).ok_or(invalid.clone())?;
            if !app.valid {
                return Err(invalid);
            }
            app.valid = false;
            let (from, amount) = (app.from, app.amount);
            token.credit(from, amount);
            Ok(Bytes::new())
        }
        C::applicationsForTransfer(c) => {
            let app = application_mut(token, c.index).ok_or("execution reverted".to_string())?;
            Ok((app.from, app.to, app.amount, app.valid).abi_encode_params().into())
        }
        C::balanceOf(c) => Ok(ret(token.balance(c.account))),
        C::owner(_) => Ok(ret(token.owner)),
        C::name(_) => Ok(ret(token.name.clone())),
        C::symbol(_) => Ok(ret(token.symbol.clone())),
        C::totalSupply(_) => Ok(ret(token.total_supply)),
        C::tradableExchange(_) => Ok(ret(token.tradable_exchange)),
        C::status(_) => Ok(ret(token.status)),
        C::transferable(_) => Ok(ret(token.transferable)),
        C::isOffering(_) => Ok(ret(token.is_offering)),
        C::memo(_) => Ok(ret(token.memo.clone())),
        C::setTradableExchange(c) => {
            token.setter(ISecurityToken::setTradableExchangeCall::SIGNATURE)?;
            token.tradable_exchange = c.exchange;
            Ok(Bytes::new())
        }
        C::setStatus(c) => {
            token.setter(ISecurityToken::setStatusCall::SIGNATURE)?;
            token.status = c.status;
            Ok(Bytes::new())
        }
        C::setTransferable(c) => {
            token.setter(ISecurityToken::setTransferableCall::SIGNATURE)?;
            token.transferable = c.transferable;
            Ok(Bytes::new())
        }
        C::changeOfferingStatus(c) => {
            token.setter(ISecurityToken::changeOfferingStatusCall::SIGNATURE)?;
            token.is_offering = c.isOffering;
            Ok(Bytes::new())
        }
        C::setMemo(c) => {
            token.setter(ISecurityToken::setMemoCall::SIGNATURE)?;
            token.memo = c.memo;
            Ok(Bytes::new())
        }
        C::setPersonalInfoAddress(_) => {
            token.setter(ISecurityToken::setPersonalInfoAddressCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setRequirePersonalInfoRegistered(_) => {
            token.setter(ISecurityToken::setRequirePersonalInfoRegisteredCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setContactInformation(_) => {
            token.setter(ISecurityToken::setContactInformationCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setPrivacyPolicy(_) => {
            token.setter(ISecurityToken::setPrivacyPolicyCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setTransferApprovalRequired(_) => {
            token.setter(ISecurityToken::setTransferApprovalRequiredCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        // Getters this mock does not model revert, so readers fall back to defaults
        _ => Err("execution reverted".to_string()),
    }
}

fn execute_bond(token: &mut MockToken, call: IStraightBond::IStraightBondCalls) -> Result<Bytes, String> {
    use IStraightBond::IStraightBondCalls as C;

    match call {
        C::faceValue(_) => Ok(ret(token.face_value)),
        C::faceValueCurrency(_) => Ok(ret(token.face_value_currency.clone())),
        C::interestRate(_) => Ok(ret(token.interest_rate)),
        C::interestPaymentDate(_) => Ok(ret(token.interest_payment_date.clone())),
        C::baseFXRate(_) => Ok(ret(token.base_fx_rate.clone())),
        C::purpose(_) => Ok(ret(token.purpose.clone())),
        C::isRedeemed(_) => Ok(ret(token.is_redeemed)),
        C::setFaceValue(c) => {
            token.setter(IStraightBond::setFaceValueCall::SIGNATURE)?;
            token.face_value = c.faceValue;
            Ok(Bytes::new())
        }
        C::setFaceValueCurrency(c) => {
            token.setter(IStraightBond::setFaceValueCurrencyCall::SIGNATURE)?;
            token.face_value_currency = c.currency;
            Ok(Bytes::new())
        }
        C::setPurpose(c) => {
            token.setter(IStraightBond::setPurposeCall::SIGNATURE)?;
            token.purpose = c.purpose;
            Ok(Bytes::new())
        }
        C::setInterestRate(c) => {
            token.setter(IStraightBond::setInterestRateCall::SIGNATURE)?;
            token.interest_rate = c.interestRate;
            Ok(Bytes::new())
        }
        C::setInterestPaymentDate(c) => {
            token.setter(IStraightBond::setInterestPaymentDateCall::SIGNATURE)?;
            token.interest_payment_date = c.interestPaymentDate;
            Ok(Bytes::new())
        }
        C::setBaseFXRate(c) => {
            token.setter(IStraightBond::setBaseFXRateCall::SIGNATURE)?;
            token.base_fx_rate = c.baseFXRate;
            Ok(Bytes::new())
        }
        C::changeToRedeemed(_) => {
            token.setter(IStraightBond::changeToRedeemedCall::SIGNATURE)?;
            token.is_redeemed = true;
            Ok(Bytes::new())
        }
        C::setInterestPaymentCurrency(_) => {
            token.setter(IStraightBond::setInterestPaymentCurrencyCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setRedemptionValue(_) => {
            token.setter(IStraightBond::setRedemptionValueCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setRedemptionValueCurrency(_) => {
            token.setter(IStraightBond::setRedemptionValueCurrencyCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        C::setRedemptionDate(_) => {
            token.setter(IStraightBond::setRedemptionDateCall::SIGNATURE)?;
            Ok(Bytes::new())
        }
        _ => Err("execution reverted".to_string()),
    }
}

fn execute_share(token: &mut MockToken, call: IShare::IShareCalls) -> Result<Bytes, String> {
    use IShare::IShareCalls as C;

    match call {
        C::issuePrice(_) => Ok(ret(token.issue_price)),
        C::principalValue(_) => Ok(ret(token.principal_value)),
        C::cancellationDate(_) => Ok(ret(token.cancellation_date.clone())),
        C::isCanceled(_) => Ok(ret(token.is_canceled)),
        C::dividendInformation(_) => {
            let (dividends, record, payment) = token.dividends.clone();
            Ok((dividends, record, payment).abi_encode_params().into())
        }
        C::setDividendInformation(c) => {
            token.setter(IShare::setDividendInformationCall::SIGNATURE)?;
            token.dividends = (c.dividends, c.dividendRecordDate, c.dividendPaymentDate);
            Ok(Bytes::new())
        }
        C::setCancellationDate(c) => {
            token.setter(IShare::setCancellationDateCall::SIGNATURE)?;
            token.cancellation_date = c.cancellationDate;
            Ok(Bytes::new())
        }
        C::setPrincipalValue(c) => {
            token.setter(IShare::setPrincipalValueCall::SIGNATURE)?;
            token.principal_value = c.principalValue;
            Ok(Bytes::new())
        }
        C::changeToCanceled(_) => {
            token.setter(IShare::changeToCanceledCall::SIGNATURE)?;
            token.is_canceled = true;
            Ok(Bytes::new())
        }
    }
}

fn execute_exchange(exchange: &mut MockExchange, input: &[u8]) -> Result<Bytes, String> {
    if let Ok(call) = IExchange::IExchangeCalls::abi_decode(input) {
        return match call {
            IExchange::IExchangeCalls::balanceOf(c) => Ok(ret(exchange
                .holdings
                .get(&(c.account, c.token))
                .map(|(balance, _)| *balance)
                .unwrap_or_default())),
            IExchange::IExchangeCalls::commitmentOf(c) => Ok(ret(exchange
                .holdings
                .get(&(c.account, c.token))
                .map(|(_, commitment)| *commitment)
                .unwrap_or_default())),
        };
    }
    if let Ok(ISecurityTokenEscrow::ISecurityTokenEscrowCalls::approveTransfer(c)) =
        ISecurityTokenEscrow::ISecurityTokenEscrowCalls::abi_decode(input)
    {
        return match exchange.escrows.get_mut(&c.escrowId) {
            Some(approved) if !*approved => {
                *approved = true;
                Ok(Bytes::new())
            }
            _ => Err("execution reverted: 230202".to_string()),
        };
    }
    Err("execution reverted".to_string())
}

fn issue(token: &mut MockToken, target: Address, lock: Address, amount: U256) {
    if lock == Address::ZERO {
        token.credit(target, amount);
    } else {
        token.credit_locked(lock, target, amount);
    }
    token.total_supply += amount;
}

fn redeem(token: &mut MockToken, target: Address, lock: Address, amount: U256) -> Result<(), String> {
    if lock == Address::ZERO {
        token.debit(target, amount, 1102)?;
    } else {
        token.debit_locked(lock, target, amount, 1101)?;
    }
    token.total_supply -= amount;
    Ok(())
}

fn application_mut(token: &mut MockToken, index: U256) -> Option<&mut MockApplication> {
    let index = usize::try_from(index).ok()?;
    token.applications.get_mut(index)
}

/// Deploys init code carrying one of the mock bytecode prefixes.
fn deploy(chain: &mut Chain, from: Address, nonce: u64, input: &[u8]) -> Result<Address, String> {
    let address = from.create(nonce);
    let token = if let Some(args) = input.strip_prefix(BOND_BYTECODE) {
        type BondArgs = (String, String, U256, U256, String, String, U256, String, String, String, String);
        let (name, symbol, total_supply, face_value, face_value_currency, _, _, _, _, _, purpose) =
            BondArgs::abi_decode_params(args).map_err(|e| format!("execution reverted: {e}"))?;
        let mut token = MockToken::new(TokenKind::Bond, from, &name, &symbol, total_supply);
        token.face_value = face_value;
        token.face_value_currency = face_value_currency;
        token.purpose = purpose;
        token
    } else if let Some(args) = input.strip_prefix(SHARE_BYTECODE) {
        type ShareArgs = (String, String, U256, U256, U256, String, String, String, U256);
        let (name, symbol, issue_price, total_supply, dividends, record, payment, cancellation, principal) =
            ShareArgs::abi_decode_params(args).map_err(|e| format!("execution reverted: {e}"))?;
        let mut token = MockToken::new(TokenKind::Share, from, &name, &symbol, total_supply);
        token.issue_price = issue_price;
        token.dividends = (dividends, record, payment);
        token.cancellation_date = cancellation;
        token.principal_value = principal;
        token
    } else {
        return Err("execution reverted".to_string());
    };
    chain.tokens.insert(address, token);
    Ok(address)
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn transaction_count(&self, account: Address) -> Result<u64, RpcError> {
        self.check_online("eth_getTransactionCount")?;
        let state = self.state.lock().unwrap();
        Ok(state.nonces.get(&account).copied().unwrap_or_default())
    }

    async fn call(&self, request: TransactionRequest, _block: BlockId) -> Result<CallOutcome, RpcError> {
        self.check_online("eth_call")?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock().unwrap();
        let mut chain = state.chain.clone();
        let from = request.from.unwrap_or_default();
        let input = request.input.input().cloned().unwrap_or_default();
        let outcome = match request.to {
            Some(TxKind::Call(to)) => execute(&mut chain, from, to, &input),
            _ => {
                let nonce = state.nonces.get(&from).copied().unwrap_or_default();
                deploy(&mut chain, from, nonce, &input).map(|_| Bytes::new())
            }
        };
        Ok(match outcome {
            Ok(data) => CallOutcome::Success(data),
            Err(reason) => CallOutcome::Reverted(reason),
        })
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<TxHash, RpcError> {
        self.check_online("eth_sendRawTransaction")?;
        self.sends.fetch_add(1, Ordering::SeqCst);

        let envelope = TxEnvelope::decode_2718(&mut encoded.as_ref())
            .map_err(|e| RpcError::chain_connection_failed("eth_sendRawTransaction", e))?;
        let from = envelope
            .recover_signer()
            .map_err(|e| RpcError::chain_connection_failed("eth_sendRawTransaction", e))?;
        let tx_hash: B256 = *envelope.tx_hash();

        let mut state = self.state.lock().unwrap();
        let expected = state.nonces.get(&from).copied().unwrap_or_default();
        if envelope.nonce() != expected {
            return Err(RpcError::ErrorResponse {
                operation: "eth_sendRawTransaction".to_string(),
                code: -32000,
                message: if envelope.nonce() < expected {
                    "nonce too low".to_string()
                } else {
                    "nonce too high".to_string()
                },
            });
        }

        if let Some(front_run) = state.front_run.take() {
            if let Some(token) = state.chain.tokens.get_mut(&front_run.token) {
                if token.debit(front_run.from, front_run.amount, 601).is_ok() {
                    token.credit(front_run.to, front_run.amount);
                }
            }
            state.block_number += 1;
        }

        let mut chain = state.chain.clone();
        let result = if std::mem::take(&mut state.fail_next_silently) {
            Err("out of gas".to_string())
        } else {
            match envelope.kind() {
                TxKind::Call(to) => execute(&mut chain, from, to, envelope.input()).map(|_| None),
                TxKind::Create => deploy(&mut chain, from, expected, envelope.input()).map(Some),
            }
        };
        let (status, contract_address) = match result {
            Ok(contract_address) => {
                state.chain = chain;
                (true, contract_address)
            }
            Err(_) => (false, None),
        };

        state.nonces.insert(from, expected + 1);
        state.block_number += 1;
        let receipt = Receipt {
            transaction_hash: tx_hash,
            block_number: state.block_number,
            status,
            contract_address,
            gas_used: 21_000,
        };
        state.receipts.insert(tx_hash, receipt);
        if std::mem::take(&mut state.reply_already_known) {
            return Err(RpcError::ErrorResponse {
                operation: "eth_sendRawTransaction".to_string(),
                code: -32000,
                message: "already known".to_string(),
            });
        }
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, RpcError> {
        self.check_online("eth_getTransactionReceipt")?;
        let state = self.state.lock().unwrap();
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}
