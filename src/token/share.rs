// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Share handle

use std::ops::Deref;

use alloy_primitives::Address;
use alloy_sol_types::SolValue;
use tracing::{info, warn, Instrument};

use super::{apply_setters, attribute_reader, fetch_common, SecurityToken};
use crate::attributes::{
    dividends_from_raw, to_fixed_point, ShareAttributes, TokenAttributes, TokenKind,
    DIVIDENDS_DECIMALS,
};
use crate::contracts::{ISecurityToken, IShare};
use crate::errors::{ReadError, TransactionError, ValidationError};
use crate::params::{ShareCreateParams, ShareUpdateParams};
use crate::signer::TransactionSigner;
use crate::spans;
use crate::submitter::{ContractCall, TxOutcome};

/// Handle for one share.
#[derive(Debug, Clone)]
pub struct ShareToken {
    token: SecurityToken,
}

impl Deref for ShareToken {
    type Target = SecurityToken;

    fn deref(&self) -> &SecurityToken {
        &self.token
    }
}

impl ShareToken {
    pub(super) fn new(token: SecurityToken) -> Self {
        Self { token }
    }

    /// Deploys `bytecode` with the share constructor arguments.
    ///
    /// Fails with [`ValidationError::AlreadyDeployed`] when this handle
    /// already has an address.
    pub async fn create(
        &self,
        bytecode: &[u8],
        params: &ShareCreateParams,
        signer: &TransactionSigner,
    ) -> Result<(ShareToken, TxOutcome), TransactionError> {
        if self.is_deployed() {
            return Err(ValidationError::AlreadyDeployed(self.address()).into());
        }
        params.validate()?;
        let dividends = to_fixed_point("dividends", &params.dividends, DIVIDENDS_DECIMALS)?;

        let args = (
            params.name.clone(),
            params.symbol.clone(),
            params.issue_price,
            params.total_supply,
            dividends,
            params.dividend_record_date.clone(),
            params.dividend_payment_date.clone(),
            params.cancellation_date.clone(),
            params.principal_value,
        )
            .abi_encode_params();
        let call = ContractCall::deploy(bytecode, &args);

        let span = spans::create_token(TokenKind::Share, signer.address());
        let (address, outcome) = self
            .engine()
            .submitter()
            .deploy(&call, signer)
            .instrument(span)
            .await?;
        self.engine().cache().invalidate_after_write(address).await;
        info!(token_address = %address, "Share created");
        Ok((self.engine().share(address), outcome))
    }

    /// Attribute snapshot, from the cache while it is fresh.
    pub async fn get(&self) -> Result<ShareAttributes, ReadError> {
        let token_address = self.address();
        if !self.is_deployed() {
            return Ok(ShareAttributes::empty(token_address));
        }

        let span = spans::get_token(TokenKind::Share, token_address);
        let attributes = self
            .engine()
            .cache()
            .get_or_refresh(token_address, TokenKind::Share, move || async move {
                let span = spans::fetch_attributes(TokenKind::Share, token_address);
                self.fetch().instrument(span).await.map(TokenAttributes::Share)
            })
            .instrument(span)
            .await?;

        match attributes {
            TokenAttributes::Share(share) => Ok(share),
            TokenAttributes::Bond(_) => {
                warn!(token_address = %token_address, "Cache returned a bond snapshot for a share");
                self.fetch().await
            }
        }
    }

    /// Applies `params` as one setter transaction per present field.
    ///
    /// Dividends, record date, and payment date are written together by a
    /// single `setDividendInformation` call.
    pub async fn update(
        &self,
        params: &ShareUpdateParams,
        signer: &TransactionSigner,
    ) -> Result<Vec<TxOutcome>, TransactionError> {
        params.validate()?;
        let token_address = self.deployed()?;
        let calls = setter_calls(token_address, params)?;
        apply_setters(&self.token, calls, signer).await
    }

    async fn fetch(&self) -> Result<ShareAttributes, ReadError> {
        let token_address = self.address();
        let reader = attribute_reader(self.engine(), token_address);
        let defaults = ShareAttributes::empty(token_address);

        let common = fetch_common(&reader, token_address).await?;
        let (issue_price, cancellation_date, principal_value, is_canceled, dividend_information) =
            futures::try_join!(
                reader.get_or(IShare::issuePriceCall {}, defaults.issue_price),
                reader.get_or(IShare::cancellationDateCall {}, defaults.cancellation_date.clone()),
                reader.get_or(IShare::principalValueCall {}, defaults.principal_value),
                reader.get_or(IShare::isCanceledCall {}, defaults.is_canceled),
                reader.get(IShare::dividendInformationCall {}),
            )?;

        let (dividends, dividend_record_date, dividend_payment_date) = match dividend_information {
            Some(info) => (
                dividends_from_raw(info.dividends),
                info.dividendRecordDate,
                info.dividendPaymentDate,
            ),
            None => (
                defaults.dividends,
                defaults.dividend_record_date,
                defaults.dividend_payment_date,
            ),
        };

        Ok(ShareAttributes {
            common,
            issue_price,
            cancellation_date,
            principal_value,
            is_canceled,
            dividends,
            dividend_record_date,
            dividend_payment_date,
        })
    }
}

/// Setter calls for `params`, in the order they are applied.
fn setter_calls(
    token: Address,
    params: &ShareUpdateParams,
) -> Result<Vec<ContractCall>, ValidationError> {
    let mut calls = Vec::new();

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
    if let Some(dividends) = &params.dividends {
        let raw = to_fixed_point("dividends", dividends, DIVIDENDS_DECIMALS)?;
        calls.push(ContractCall::new(
            token,
            &IShare::setDividendInformationCall {
                dividends: raw,
                dividendRecordDate: params.dividend_record_date.clone().unwrap_or_default(),
                dividendPaymentDate: params.dividend_payment_date.clone().unwrap_or_default(),
            },
        ));
    }
    if let Some(date) = &params.cancellation_date {
        calls.push(ContractCall::new(
            token,
            &IShare::setCancellationDateCall {
                cancellationDate: date.clone(),
            },
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
    if let Some(status) = params.status {
        calls.push(ContractCall::new(token, &ISecurityToken::setStatusCall { status }));
    }
    if let Some(transferable) = params.transferable {
        calls.push(ContractCall::new(token, &ISecurityToken::setTransferableCall { transferable }));
    }
    if let Some(is_offering) = params.is_offering {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::changeOfferingStatusCall {
                isOffering: is_offering,
            },
        ));
    }
    if let Some(required) = params.transfer_approval_required {
        calls.push(ContractCall::new(
            token,
            &ISecurityToken::setTransferApprovalRequiredCall { required },
        ));
    }
    if let Some(principal_value) = params.principal_value {
        calls.push(ContractCall::new(
            token,
            &IShare::setPrincipalValueCall {
                principalValue: principal_value,
            },
        ));
    }
    if params.is_canceled == Some(true) {
        calls.push(ContractCall::new(token, &IShare::changeToCanceledCall {}));
    }
    if let Some(memo) = &params.memo {
        calls.push(ContractCall::new(token, &ISecurityToken::setMemoCall { memo: memo.clone() }));
    }

    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use alloy_sol_types::SolCall;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    const TOKEN: Address = Address::repeat_byte(0x5a);

    #[test]
    fn test_dividend_information_is_one_setter() {
        let params = ShareUpdateParams {
            dividends: Some(BigDecimal::from_str("0.0000000000001").unwrap()),
            dividend_record_date: Some("20241231".to_string()),
            dividend_payment_date: Some("20250331".to_string()),
            status: Some(false),
            ..Default::default()
        };

        let calls = setter_calls(TOKEN, &params).unwrap();

        assert_eq!(calls.len(), 2);
        let decoded = IShare::setDividendInformationCall::abi_decode(&calls[0].input).unwrap();
        assert_eq!(decoded.dividends, U256::from(1));
        assert_eq!(decoded.dividendPaymentDate, "20250331");
        assert_eq!(calls[1].label, ISecurityToken::setStatusCall::SIGNATURE);
    }

    #[test]
    fn test_cancel_precedes_memo() {
        let params = ShareUpdateParams {
            memo: Some("closing".to_string()),
            is_canceled: Some(true),
            principal_value: Some(U256::from(100)),
            ..Default::default()
        };

        let labels: Vec<_> = setter_calls(TOKEN, &params)
            .unwrap()
            .into_iter()
            .map(|call| call.label)
            .collect();

        assert_eq!(
            labels,
            vec![
                IShare::setPrincipalValueCall::SIGNATURE,
                IShare::changeToCanceledCall::SIGNATURE,
                ISecurityToken::setMemoCall::SIGNATURE,
            ]
        );
    }
}
