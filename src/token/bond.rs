// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Straight bond handle

use std::ops::Deref;

use alloy_primitives::Address;
use alloy_sol_types::SolValue;
use tracing::{info, warn, Instrument};

use super::{apply_setters, attribute_reader, fetch_common, SecurityToken};
use crate::attributes::{
    encode_interest_payment_dates, interest_rate_from_raw, parse_base_fx_rate,
    parse_interest_payment_dates, to_fixed_point, BondAttributes, TokenAttributes, TokenKind,
    INTEREST_RATE_DECIMALS,
};
use crate::contracts::{ISecurityToken, IStraightBond};
use crate::errors::{ReadError, TransactionError, ValidationError};
use crate::params::{BondCreateParams, BondUpdateParams};
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TxOutcome};

/// Handle for one straight bond.
#[derive(Debug, Clone)]
pub struct BondToken {
    token: SecurityToken,
}

impl Deref for BondToken {
    type Target = SecurityToken;

    fn deref(&self) -> &SecurityToken {
        &self.token
    }
}

impl BondToken {
    pub(super) fn new(token: SecurityToken) -> Self {
        Self { token }
    }

    /// Deploys `bytecode` with the bond constructor arguments.
    ///
    /// Returns a handle for the deployed contract. Fails with
    /// [`ValidationError::AlreadyDeployed`] when this handle already has an address.
    pub async fn create(
        &self,
        bytecode: &[u8],
        params: &BondCreateParams,
        signer: &TransactionSigner,
    ) -> Result<(BondToken, TxOutcome), TransactionError> {
        if self.is_deployed() {
            return Err(ValidationError::AlreadyDeployed(self.address()).into());
        }
        params.validate()?;

        let args = (
            params.name.clone(),
            params.symbol.clone(),
            params.total_supply,
            params.face_value,
            params.face_value_currency.clone(),
            params.redemption_date.clone(),
            params.redemption_value,
            params.redemption_value_currency.clone(),
            params.return_date.clone(),
            params.return_amount.clone(),
            params.purpose.clone(),
        )
            .abi_encode_params();
        let call = ContractCall::deploy(bytecode, &args);

        let span = spans::create_token(TokenKind::Bond, signer.address());
        let (address, outcome) = self
            .engine()
            .submitter()
            .deploy(&call, signer)
            .instrument(span)
            .await?;
        self.engine().cache().invalidate_after_write(address).await;
        info!(token_address = %address, "Bond created");
        Ok((self.engine().bond(address), outcome))
    }

    /// Attribute snapshot, from the cache while it is fresh.
    ///
    /// An undeployed handle returns the default snapshot without touching
    /// the ledger or the cache.
    pub async fn get(&self) -> Result<BondAttributes, ReadError> {
        let token_address = self.address();
        if !self.is_deployed() {
            return Ok(BondAttributes::empty(token_address));
        }

        let span = spans::get_token(TokenKind::Bond, token_address);
        let attributes = self
            .engine()
            .cache()
            .get_or_refresh(token_address, TokenKind::Bond, move || async move {
                let span = spans::fetch_attributes(TokenKind::Bond, token_address);
                self.fetch().instrument(span).await.map(TokenAttributes::Bond)
            })
            .instrument(span)
            .await?;

        match attributes {
            TokenAttributes::Bond(bond) => Ok(bond),
            TokenAttributes::Share(_) => {
                warn!(token_address = %token_address, "Cache returned a share snapshot for a bond");
                self.fetch().await
            }
        }
    }

    /// Applies `params` as one setter transaction per present field.
    ///
    /// Setters run in a fixed order and stop at the first failure; the
    /// outcomes of the setters that were applied are returned on success.
    pub async fn update(
        &self,
        params: &BondUpdateParams,
        signer: &TransactionSigner,
    ) -> Result<Vec<TxOutcome>, TransactionError> {
        params.validate()?;
        let token_address = self.deployed()?;
        let calls = setter_calls(token_address, params)?;
        apply_setters(&self.token, calls, signer).await
    }

    async fn fetch(&self) -> Result<BondAttributes, ReadError> {
        let token_address = self.address();
        let reader = attribute_reader(self.engine(), token_address);
        let defaults = BondAttributes::empty(token_address);

        let common = fetch_common(&reader, token_address).await?;
        let (
            face_value,
            face_value_currency,
            interest_rate,
            interest_payment_date,
            interest_payment_currency,
            redemption_date,
            redemption_value,
        ) = futures::try_join!(
            reader.get_or(IStraightBond::faceValueCall {}, defaults.face_value),
            reader.get_or(
                IStraightBond::faceValueCurrencyCall {},
                defaults.face_value_currency.clone()
            ),
            reader.get(IStraightBond::interestRateCall {}),
            reader.get_or(IStraightBond::interestPaymentDateCall {}, String::new()),
            reader.get_or(
                IStraightBond::interestPaymentCurrencyCall {},
                defaults.interest_payment_currency.clone()
            ),
            reader.get_or(IStraightBond::redemptionDateCall {}, defaults.redemption_date.clone()),
            reader.get_or(IStraightBond::redemptionValueCall {}, defaults.redemption_value),
        )?;
        let (
            redemption_value_currency,
            return_date,
            return_amount,
            base_fx_rate,
            purpose,
            is_redeemed,
        ) = futures::try_join!(
            reader.get_or(
                IStraightBond::redemptionValueCurrencyCall {},
                defaults.redemption_value_currency.clone()
            ),
            reader.get_or(IStraightBond::returnDateCall {}, defaults.return_date.clone()),
            reader.get_or(IStraightBond::returnAmountCall {}, defaults.return_amount.clone()),
            reader.get_or(IStraightBond::baseFXRateCall {}, String::new()),
            reader.get_or(IStraightBond::purposeCall {}, defaults.purpose.clone()),
            reader.get_or(IStraightBond::isRedeemedCall {}, defaults.is_redeemed),
        )?;

        Ok(BondAttributes {
            common,
            face_value,
            face_value_currency,
            interest_rate: interest_rate
                .map(interest_rate_from_raw)
                .unwrap_or(defaults.interest_rate),
            interest_payment_date: parse_interest_payment_dates(&interest_payment_date),
            interest_payment_currency,
            redemption_date,
            redemption_value,
            redemption_value_currency,
            return_date,
            return_amount,
            base_fx_rate: parse_base_fx_rate(&base_fx_rate),
            purpose,
            is_redeemed,
        })
    }
}

/// Setter calls for `params`, in the order they are applied.
fn setter_calls(
    token: Address,
    params: &BondUpdateParams,
) -> Result<Vec<ContractCall>, ValidationError> {
    let mut calls = Vec::new();

    if let Some(face_value) = params.face_value {
        calls.push(ContractCall::new(token, &IStraightBond::setFaceValueCall { faceValue: face_value }));
    }
    if let Some(currency) = &params.face_value_currency {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setFaceValueCurrencyCall {
                currency: currency.clone(),
            },
        ));
    }
    if let Some(purpose) = &params.purpose {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setPurposeCall {
                purpose: purpose.clone(),
            },
        ));
    }
    if let Some(rate) = &params.interest_rate {
        let raw = to_fixed_point("interest_rate", rate, INTEREST_RATE_DECIMALS)?;
        calls.push(ContractCall::new(token, &IStraightBond::setInterestRateCall { interestRate: raw }));
    }
    if let Some(dates) = &params.interest_payment_date {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setInterestPaymentDateCall {
                interestPaymentDate: encode_interest_payment_dates(dates)?,
            },
        ));
    }
    if let Some(currency) = &params.interest_payment_currency {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setInterestPaymentCurrencyCall {
                currency: currency.clone(),
            },
        ));
    }
    if let Some(value) = params.redemption_value {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setRedemptionValueCall {
                redemptionValue: value,
            },
        ));
    }
    if let Some(currency) = &params.redemption_value_currency {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setRedemptionValueCurrencyCall {
                currency: currency.clone(),
            },
        ));
    }
    if let Some(date) = &params.redemption_date {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setRedemptionDateCall {
                redemptionDate: date.clone(),
            },
        ));
    }
    if let Some(rate) = &params.base_fx_rate {
        calls.push(ContractCall::new(
            token,
            &IStraightBond::setBaseFXRateCall {
                baseFXRate: rate.normalized().to_plain_string(),
            },
        ));
    }
    if let Some(transferable) = params.transferable {
        calls.push(ContractCall::new(token, &ISecurityToken::setTransferableCall { transferable }));
    }
    if let Some(status) = params.status {
        calls.push(ContractCall::new(token, &ISecurityToken::setStatusCall { status }));
    }
    if let Some(is_offering) = params.is_offering {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::changeOfferingStatusCall {
                isOffering: is_offering,
            },
        ));
    }
    if params.is_redeemed == Some(true) {
        calls.push(ContractCall::new(token, &IStraightBond::changeToRedeemedCall {}));
    }
    if let Some(exchange) = params.tradable_exchange_contract_address {
        calls.push(ContractCall::new(token, &ISecurityToken::setTradableExchangeCall { exchange }));
    }
    if let Some(personal_info) = params.personal_info_contract_address {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setPersonalInfoAddressCall {
                personalInfo: personal_info,
            },
        ));
    }
    if let Some(required) = params.require_personal_info_registered {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setRequirePersonalInfoRegisteredCall { required },
        ));
    }
    if let Some(contact) = &params.contact_information {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setContactInformationCall {
                contactInformation: contact.clone(),
            },
        ));
    }
    if let Some(policy) = &params.privacy_policy {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setPrivacyPolicyCall {
                privacyPolicy: policy.clone(),
            },
        ));
    }
    if let Some(required) = params.transfer_approval_required {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setTransferApprovalRequiredCall { required },
        ));
    }
    if let Some(memo) = &params.memo {
        calls.push(ContractCall::new(token, &ISecurityToken::setMemoCall { memo: memo.clone() }));
    }

    Ok(calls)
}
