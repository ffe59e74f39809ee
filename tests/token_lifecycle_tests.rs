// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token creation, attribute reads, attribute updates, and balance reads

mod helpers;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use bigdecimal::BigDecimal;
use helpers::{
    engine, issuer_signer, MockLedger, BOND_BYTECODE, EXCHANGE, ISSUER, LOCK_ADDRESS, SHARE_BYTECODE,
    USER,
};
use tokenops::cache::{AttributeStore, MemoryAttributeStore};
use tokenops::contracts::{ISecurityToken, IStraightBond};
use tokenops::params::{
    BondCreateParams, BondUpdateParams, ForcedTransferParams, ShareCreateParams, ShareUpdateParams,
};
use tokenops::{EngineConfigBuilder, TokenEngine, TransactionError, ValidationError};

fn bond_params() -> BondCreateParams {
    BondCreateParams {
        name: "Green Bond 2030".to_string(),
        symbol: "GB30".to_string(),
        total_supply: U256::from(10_000),
        face_value: U256::from(100),
        face_value_currency: "JPY".to_string(),
        redemption_date: "20301231".to_string(),
        redemption_value: U256::from(100),
        redemption_value_currency: "JPY".to_string(),
        return_date: "20301231".to_string(),
        return_amount: "coupon".to_string(),
        purpose: "renewables".to_string(),
    }
}

#[tokio::test]
async fn test_create_bond_and_read_back() {
    let ledger = MockLedger::new();
    let (engine, store) = engine(ledger.clone(), true);

    let (bond, outcome) = engine
        .bond(Address::ZERO)
        .create(BOND_BYTECODE, &bond_params(), &issuer_signer())
        .await
        .expect("deployment should succeed");

    assert_eq!(outcome.receipt.contract_address, Some(bond.address()));
    assert!(
        store.latest_marker(bond.address()).await.expect("marker lookup").is_some(),
        "Deployment records a marker for the new address"
    );

    let attributes = bond.get().await.expect("read should succeed");
    assert_eq!(attributes.common.name, "Green Bond 2030");
    assert_eq!(attributes.common.owner_address, ISSUER);
    assert_eq!(attributes.common.total_supply, U256::from(10_000));
    assert_eq!(attributes.face_value, U256::from(100));
    assert_eq!(attributes.purpose, "renewables");
    // Getters the contract does not answer fall back to defaults
    assert_eq!(attributes.return_amount, "");
    assert_eq!(attributes.common.contact_information, "");
    assert_eq!(ledger.balance_of(bond.address(), ISSUER), U256::from(10_000));
}

#[tokio::test]
async fn test_create_on_deployed_handle_is_rejected() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_bond(ISSUER, U256::from(1));
    let (engine, _store) = engine(ledger.clone(), true);

    let err = engine
        .bond(token)
        .create(BOND_BYTECODE, &bond_params(), &issuer_signer())
        .await
        .expect_err("handle already has an address");

    assert!(matches!(
        err,
        TransactionError::Validation(ValidationError::AlreadyDeployed(address)) if address == token
    ));
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test]
async fn test_create_share_scales_dividends() {
    let ledger = MockLedger::new();
    let (engine, _store) = engine(ledger.clone(), false);

    let params = ShareCreateParams {
        name: "Common Share".to_string(),
        symbol: "CS".to_string(),
        issue_price: U256::from(1_000),
        total_supply: U256::from(500),
        dividends: BigDecimal::from_str("0.01").expect("decimal"),
        dividend_record_date: "20251231".to_string(),
        dividend_payment_date: "20260331".to_string(),
        cancellation_date: String::new(),
        principal_value: U256::from(1_000),
    };
    let (share, _) = engine
        .share(Address::ZERO)
        .create(SHARE_BYTECODE, &params, &issuer_signer())
        .await
        .expect("deployment should succeed");

    let attributes = share.get().await.expect("read should succeed");
    assert_eq!(attributes.dividends, BigDecimal::from_str("0.01").expect("decimal"));
    assert_eq!(attributes.dividend_record_date, "20251231");
    assert_eq!(attributes.issue_price, U256::from(1_000));
    assert!(!attributes.is_canceled);
}

#[tokio::test]
async fn test_update_applies_setters_in_order() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_bond(ISSUER, U256::from(100));
    let (engine, _store) = engine(ledger.clone(), true);
    let bond = engine.bond(token);

    let params = BondUpdateParams {
        memo: Some("updated".to_string()),
        status: Some(false),
        interest_rate: Some(BigDecimal::from_str("1.2345").expect("decimal")),
        interest_payment_date: Some(vec!["0331".to_string(), "0930".to_string()]),
        face_value: Some(U256::from(200)),
        is_redeemed: Some(true),
        ..Default::default()
    };
    let outcomes = bond
        .update(&params, &issuer_signer())
        .await
        .expect("update should succeed");

    assert_eq!(outcomes.len(), 6, "One transaction per present field");
    assert_eq!(
        ledger.setter_log(token),
        vec![
            IStraightBond::setFaceValueCall::SIGNATURE,
            IStraightBond::setInterestRateCall::SIGNATURE,
            IStraightBond::setInterestPaymentDateCall::SIGNATURE,
            ISecurityToken::setStatusCall::SIGNATURE,
            IStraightBond::changeToRedeemedCall::SIGNATURE,
            ISecurityToken::setMemoCall::SIGNATURE,
        ]
    );

    let attributes = bond.get().await.expect("read should succeed");
    assert_eq!(attributes.face_value, U256::from(200));
    assert_eq!(attributes.interest_rate, BigDecimal::from_str("1.2345").expect("decimal"));
    assert_eq!(&attributes.interest_payment_date[..2], &["0331", "0930"]);
    assert!(!attributes.common.status);
    assert!(attributes.is_redeemed);
    assert_eq!(attributes.common.memo, "updated");
}

#[tokio::test]
async fn test_update_stops_at_failing_setter() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_bond(ISSUER, U256::from(100));
    ledger.reject_setter(token, IStraightBond::setInterestRateCall::SIGNATURE);
    let (engine, store) = engine(ledger.clone(), true);

    let params = BondUpdateParams {
        face_value: Some(U256::from(300)),
        interest_rate: Some(BigDecimal::from(2)),
        memo: Some("never applied".to_string()),
        ..Default::default()
    };
    let err = engine
        .bond(token)
        .update(&params, &issuer_signer())
        .await
        .expect_err("interest rate setter reverts");

    assert!(err.as_revert().is_some(), "Failure should be the setter's revert: {err}");
    assert_eq!(ledger.setter_log(token), vec![IStraightBond::setFaceValueCall::SIGNATURE]);
    assert!(
        store.latest_marker(token).await.expect("marker lookup").is_some(),
        "A partially applied update still invalidates the cache"
    );
}

#[tokio::test]
async fn test_invalid_update_sends_nothing() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_share(ISSUER, U256::from(100));
    let (engine, _store) = engine(ledger.clone(), true);

    let params = ShareUpdateParams {
        dividends: Some(BigDecimal::from(1)),
        dividend_record_date: Some("20251231".to_string()),
        ..Default::default()
    };
    let err = engine
        .share(token)
        .update(&params, &issuer_signer())
        .await
        .expect_err("payment date is missing");

    assert!(matches!(err, TransactionError::Validation(ValidationError::InvalidField { .. })));
    assert_eq!(ledger.sends(), 0);
}

#[tokio::test]
async fn test_account_balance_includes_exchange_holdings() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_share(ISSUER, U256::from(1_000));
    let (engine, _store) = engine(ledger.clone(), true);
    let share = engine.share(token);

    share
        .forced_transfer(
            &ForcedTransferParams {
                from_address: ISSUER,
                to_address: USER,
                amount: U256::from(100),
            },
            &issuer_signer(),
        )
        .await
        .expect("transfer should succeed");
    assert_eq!(share.get_account_balance(USER).await.expect("read"), U256::from(100));

    ledger.set_tradable_exchange(token, EXCHANGE);
    ledger.set_exchange_holding(EXCHANGE, USER, token, U256::from(30), U256::from(5));

    assert_eq!(share.get_account_balance(USER).await.expect("read"), U256::from(135));
}

#[tokio::test]
async fn test_undeployed_handle_reads_defaults_offline() {
    let ledger = MockLedger::new();
    ledger.set_offline(true);
    let (engine, _store) = engine(ledger.clone(), true);
    let bond = engine.bond(Address::ZERO);

    let attributes = bond.get().await.expect("no ledger access needed");
    assert_eq!(attributes.face_value_currency, "JPY");
    assert_eq!(attributes.interest_payment_date.len(), 12);
    assert_eq!(bond.get_account_balance(USER).await.expect("read"), U256::ZERO);
    assert_eq!(bond.get_locked_amount(LOCK_ADDRESS, USER).await.expect("read"), U256::ZERO);
    assert!(bond.get_transfer_application(U256::ZERO).await.expect("read").is_none());
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_receipt_timeout_reports_unknown_outcome() {
    let ledger = MockLedger::new();
    let token = ledger.deploy_bond(ISSUER, U256::from(100));
    ledger.withhold_receipts(true);
    let config = EngineConfigBuilder::new()
        .receipt_timeout(Duration::from_secs(30))
        .receipt_poll_interval(Duration::from_secs(1))
        .build();
    let store = Arc::new(MemoryAttributeStore::new());
    let engine = TokenEngine::new(ledger.clone(), store.clone(), config);

    let err = engine
        .bond(token)
        .forced_transfer(
            &ForcedTransferParams {
                from_address: ISSUER,
                to_address: USER,
                amount: U256::from(1),
            },
            &issuer_signer(),
        )
        .await
        .expect_err("receipt never arrives");

    let send = err.as_send_error().expect("Should be a send error");
    assert!(send.outcome_unknown(), "Timeout must be reported as unknown: {send}");
    assert_eq!(ledger.sends(), 1, "Writes are never retried");
    // The transaction landed even though the caller could not confirm it
    assert_eq!(ledger.balance_of(token, USER), U256::from(1));
    assert!(store.latest_marker(token).await.expect("marker lookup").is_none());
}
