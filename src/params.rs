// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Operation intents
//!
//! One struct per contract operation. Each is validated with `validate()`
//! before any network call; a failure is a [`ValidationError`] and nothing
//! is sent.

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::attributes::{
    to_fixed_point, BASE_FX_RATE_DECIMALS, DIVIDENDS_DECIMALS, INTEREST_RATE_DECIMALS,
};
use crate::config::constants::INTEREST_PAYMENT_DATE_SLOTS;
use crate::errors::ValidationError;

fn positive(field: &'static str, value: U256) -> Result<(), ValidationError> {
    if value.is_zero() {
        return Err(ValidationError::NonPositiveAmount { field });
    }
    Ok(())
}

fn non_zero_address(field: &'static str, address: Address) -> Result<(), ValidationError> {
    if address.is_zero() {
        return Err(ValidationError::ZeroAddress { field });
    }
    Ok(())
}

/// Issuer-forced transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedTransferParams {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: U256,
}

impl ForcedTransferParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}

/// Transfer from the sender to one recipient, used in bulk transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferParams {
    pub to_address: Address,
    pub amount: U256,
}

impl TransferParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}

/// Additional issuance to an account's free balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalIssueParams {
    pub account_address: Address,
    pub amount: U256,
}

impl AdditionalIssueParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}

/// Redemption from an account's free balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemParams {
    pub account_address: Address,
    pub amount: U256,
}

impl RedeemParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}

/// Lock of the sender's own free balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockParams {
    pub lock_address: Address,
    pub value: U256,
    /// Opaque payload echoed into the contract event
    pub data: String,
}

impl LockParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("value", self.value)
    }
}

/// Issuer lock of an arbitrary account's free balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceLockParams {
    pub lock_address: Address,
    pub account_address: Address,
    pub value: U256,
    pub data: String,
}

impl ForceLockParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("value", self.value)
    }
}

/// Release of a locked amount to a recipient's free balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceUnlockParams {
    pub lock_address: Address,
    pub account_address: Address,
    pub recipient_address: Address,
    pub value: U256,
    pub data: String,
}

impl ForceUnlockParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("value", self.value)?;
        non_zero_address("recipient_address", self.recipient_address)
    }
}

/// Move of a locked amount from one account to another under the same lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceChangeLockedAccountParams {
    pub lock_address: Address,
    pub before_account_address: Address,
    pub after_account_address: Address,
    pub value: U256,
    pub data: String,
}

impl ForceChangeLockedAccountParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("value", self.value)?;
        non_zero_address("after_account_address", self.after_account_address)
    }
}

/// Approval of a pending transfer application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveTransferParams {
    pub application_id: U256,
    pub data: String,
}

/// Cancellation of a pending transfer application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTransferParams {
    pub application_id: U256,
    pub data: String,
}

/// Constructor arguments of a straight bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondCreateParams {
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
    pub face_value: U256,
    pub face_value_currency: String,
    pub redemption_date: String,
    pub redemption_value: U256,
    pub redemption_value_currency: String,
    pub return_date: String,
    pub return_amount: String,
    pub purpose: String,
}

impl BondCreateParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        currency("face_value_currency", &self.face_value_currency)?;
        optional_currency("redemption_value_currency", &self.redemption_value_currency)
    }
}

/// Constructor arguments of a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCreateParams {
    pub name: String,
    pub symbol: String,
    pub issue_price: U256,
    pub total_supply: U256,
    /// Dividends per share, at most 13 decimal places
    pub dividends: BigDecimal,
    pub dividend_record_date: String,
    pub dividend_payment_date: String,
    pub cancellation_date: String,
    pub principal_value: U256,
}

impl ShareCreateParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        to_fixed_point("dividends", &self.dividends, DIVIDENDS_DECIMALS).map(|_| ())
    }
}

/// Attribute changes for a straight bond; `None` leaves a field untouched.
///
/// Each present field becomes one setter transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondUpdateParams {
    pub face_value: Option<U256>,
    pub face_value_currency: Option<String>,
    pub purpose: Option<String>,
    /// Percent, at most 4 decimal places
    pub interest_rate: Option<BigDecimal>,
    /// Up to twelve `MMDD` dates
    pub interest_payment_date: Option<Vec<String>>,
    pub interest_payment_currency: Option<String>,
    pub redemption_value: Option<U256>,
    pub redemption_value_currency: Option<String>,
    pub redemption_date: Option<String>,
    /// At most 6 decimal places
    pub base_fx_rate: Option<BigDecimal>,
    pub transferable: Option<bool>,
    pub status: Option<bool>,
    pub is_offering: Option<bool>,
    /// Only `true` is accepted; redemption cannot be undone
    pub is_redeemed: Option<bool>,
    pub tradable_exchange_contract_address: Option<Address>,
    pub personal_info_contract_address: Option<Address>,
    pub require_personal_info_registered: Option<bool>,
    pub contact_information: Option<String>,
    pub privacy_policy: Option<String>,
    pub transfer_approval_required: Option<bool>,
    pub memo: Option<String>,
}

impl BondUpdateParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(currency_code) = &self.face_value_currency {
            currency("face_value_currency", currency_code)?;
        }
        if let Some(rate) = &self.interest_rate {
            if *rate > BigDecimal::from(100) {
                return Err(ValidationError::invalid_field(
                    "interest_rate",
                    "must not exceed 100",
                ));
            }
            to_fixed_point("interest_rate", rate, INTEREST_RATE_DECIMALS)?;
        }
        if let Some(dates) = &self.interest_payment_date {
            if dates.len() > INTEREST_PAYMENT_DATE_SLOTS {
                return Err(ValidationError::invalid_field(
                    "interest_payment_date",
                    format!("at most {INTEREST_PAYMENT_DATE_SLOTS} dates are allowed"),
                ));
            }
        }
        if let Some(currency_code) = &self.interest_payment_currency {
            optional_currency("interest_payment_currency", currency_code)?;
        }
        if let Some(currency_code) = &self.redemption_value_currency {
            optional_currency("redemption_value_currency", currency_code)?;
        }
        if let Some(rate) = &self.base_fx_rate {
            to_fixed_point("base_fx_rate", rate, BASE_FX_RATE_DECIMALS)?;
        }
        if self.is_redeemed == Some(false) {
            return Err(ValidationError::invalid_field(
                "is_redeemed",
                "cannot be updated to false",
            ));
        }
        Ok(())
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Attribute changes for a share; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareUpdateParams {
    pub tradable_exchange_contract_address: Option<Address>,
    pub personal_info_contract_address: Option<Address>,
    pub require_personal_info_registered: Option<bool>,
    /// Dividends per share, at most 13 decimal places; requires both dates
    pub dividends: Option<BigDecimal>,
    pub dividend_record_date: Option<String>,
    pub dividend_payment_date: Option<String>,
    pub cancellation_date: Option<String>,
    pub contact_information: Option<String>,
    pub privacy_policy: Option<String>,
    pub status: Option<bool>,
    pub transferable: Option<bool>,
    pub is_offering: Option<bool>,
    pub transfer_approval_required: Option<bool>,
    pub principal_value: Option<U256>,
    /// Only `true` is accepted; cancellation cannot be undone
    pub is_canceled: Option<bool>,
    pub memo: Option<String>,
}

impl ShareUpdateParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(dividends) = &self.dividends {
            to_fixed_point("dividends", dividends, DIVIDENDS_DECIMALS)?;
            if self.dividend_record_date.is_none() || self.dividend_payment_date.is_none() {
                return Err(ValidationError::invalid_field(
                    "dividends",
                    "record date and payment date are required with dividends",
                ));
            }
        }
        if self.is_canceled == Some(false) {
            return Err(ValidationError::invalid_field(
                "is_canceled",
                "cannot be updated to false",
            ));
        }
        Ok(())
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A three-letter currency code.
fn currency(field: &'static str, code: &str) -> Result<(), ValidationError> {
    if code.chars().count() != 3 {
        return Err(ValidationError::invalid_field(
            field,
            "must be a three-letter currency code",
        ));
    }
    Ok(())
}

/// A three-letter currency code or the empty string.
fn optional_currency(field: &'static str, code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Ok(());
    }
    currency(field, code)
}
