// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token attribute snapshots and their on-chain encodings
//!
//! A snapshot is the flat, display-ready view of everything a token contract
//! exposes. It is produced whole from chain reads (see
//! [`token`](crate::token)) or served whole from the attribute cache; it is
//! never partially updated.
//!
//! Several attributes are stored on chain in a scaled or serialized form:
//!
//! | Attribute | On chain | Snapshot |
//! |---|---|---|
//! | interest rate | integer, 4 implied decimals | [`BigDecimal`] |
//! | dividends | integer, 13 implied decimals | [`BigDecimal`] |
//! | base FX rate | decimal string | `f64`, `0.0` when unparsable |
//! | interest payment dates | JSON object `interestPaymentDate1..12` | 12-element list |

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_CURRENCY, INTEREST_PAYMENT_DATE_SLOTS};
use crate::errors::ValidationError;

/// Implied decimal places of the on-chain interest rate.
pub const INTEREST_RATE_DECIMALS: i64 = 4;

/// Implied decimal places of on-chain dividends.
pub const DIVIDENDS_DECIMALS: i64 = 13;

/// Maximum decimal places accepted for a base FX rate.
pub const BASE_FX_RATE_DECIMALS: i64 = 6;

/// Kind of security token behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Straight bond
    Bond,
    /// Share
    Share,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Bond => write!(f, "bond"),
            TokenKind::Share => write!(f, "share"),
        }
    }
}

/// Attributes every security token exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonAttributes {
    pub token_address: Address,
    pub owner_address: Address,
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
    pub tradable_exchange_contract_address: Address,
    pub contact_information: String,
    pub privacy_policy: String,
    pub status: bool,
    pub personal_info_contract_address: Address,
    pub require_personal_info_registered: bool,
    pub transferable: bool,
    pub is_offering: bool,
    pub transfer_approval_required: bool,
    pub memo: String,
}

impl CommonAttributes {
    /// Snapshot of a token with nothing readable: every getter at its default.
    pub fn empty(token_address: Address) -> Self {
        Self {
            token_address,
            owner_address: Address::ZERO,
            name: String::new(),
            symbol: String::new(),
            total_supply: U256::ZERO,
            tradable_exchange_contract_address: Address::ZERO,
            contact_information: String::new(),
            privacy_policy: String::new(),
            status: true,
            personal_info_contract_address: Address::ZERO,
            require_personal_info_registered: true,
            transferable: false,
            is_offering: false,
            transfer_approval_required: false,
            memo: String::new(),
        }
    }
}

/// Straight bond snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    pub face_value: U256,
    pub face_value_currency: String,
    pub interest_rate: BigDecimal,
    /// Always [`INTEREST_PAYMENT_DATE_SLOTS`] entries, `""` where unset
    pub interest_payment_date: Vec<String>,
    pub interest_payment_currency: String,
    pub redemption_date: String,
    pub redemption_value: U256,
    pub redemption_value_currency: String,
    pub return_date: String,
    pub return_amount: String,
    pub base_fx_rate: f64,
    pub purpose: String,
    pub is_redeemed: bool,
}

impl BondAttributes {
    /// Default snapshot, also returned for an undeployed bond.
    pub fn empty(token_address: Address) -> Self {
        Self {
            common: CommonAttributes::empty(token_address),
            face_value: U256::ZERO,
            face_value_currency: DEFAULT_CURRENCY.to_string(),
            interest_rate: BigDecimal::default(),
            interest_payment_date: vec![String::new(); INTEREST_PAYMENT_DATE_SLOTS],
            interest_payment_currency: String::new(),
            redemption_date: String::new(),
            redemption_value: U256::ZERO,
            redemption_value_currency: String::new(),
            return_date: String::new(),
            return_amount: String::new(),
            base_fx_rate: 0.0,
            purpose: String::new(),
            is_redeemed: false,
        }
    }
}

/// Share snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareAttributes {
    #[serde(flatten)]
    pub common: CommonAttributes,
    pub issue_price: U256,
    pub cancellation_date: String,
    pub principal_value: U256,
    pub is_canceled: bool,
    pub dividends: BigDecimal,
    pub dividend_record_date: String,
    pub dividend_payment_date: String,
}

impl ShareAttributes {
    /// Default snapshot, also returned for an undeployed share.
    pub fn empty(token_address: Address) -> Self {
        Self {
            common: CommonAttributes::empty(token_address),
            issue_price: U256::ZERO,
            cancellation_date: String::new(),
            principal_value: U256::ZERO,
            is_canceled: false,
            dividends: BigDecimal::default(),
            dividend_record_date: String::new(),
            dividend_payment_date: String::new(),
        }
    }
}

/// A snapshot of either token kind, as stored in the attribute cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenAttributes {
    Bond(BondAttributes),
    Share(ShareAttributes),
}

impl TokenAttributes {
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenAttributes::Bond(_) => TokenKind::Bond,
            TokenAttributes::Share(_) => TokenKind::Share,
        }
    }

    pub fn common(&self) -> &CommonAttributes {
        match self {
            TokenAttributes::Bond(bond) => &bond.common,
            TokenAttributes::Share(share) => &share.common,
        }
    }

    pub fn into_bond(self) -> Option<BondAttributes> {
        match self {
            TokenAttributes::Bond(bond) => Some(bond),
            TokenAttributes::Share(_) => None,
        }
    }

    pub fn into_share(self) -> Option<ShareAttributes> {
        match self {
            TokenAttributes::Share(share) => Some(share),
            TokenAttributes::Bond(_) => None,
        }
    }
}

/// Interprets `raw` as a fixed-point number with `decimals` implied places.
pub fn from_fixed_point(raw: U256, decimals: i64) -> BigDecimal {
    BigDecimal::from_str(&format!("{raw}E-{decimals}")).unwrap_or_default()
}

/// Encodes `value` as a fixed-point integer with `decimals` implied places.
///
/// Rejects negative values and values with more than `decimals` fractional
/// digits.
pub fn to_fixed_point(
    field: &'static str,
    value: &BigDecimal,
    decimals: i64,
) -> Result<U256, ValidationError> {
    if *value < BigDecimal::default() {
        return Err(ValidationError::invalid_field(field, "must not be negative"));
    }
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale > decimals {
        return Err(ValidationError::invalid_field(
            field,
            format!("at most {decimals} decimal places are allowed"),
        ));
    }
    let scaled = (value * BigDecimal::from_str(&format!("1E{decimals}")).unwrap_or_default())
        .with_scale(0);
    U256::from_str(&scaled.to_plain_string())
        .map_err(|e| ValidationError::invalid_field(field, e.to_string()))
}

/// Interest rate from its on-chain integer (4 implied decimals).
pub fn interest_rate_from_raw(raw: U256) -> BigDecimal {
    from_fixed_point(raw, INTEREST_RATE_DECIMALS)
}

/// Dividends per share from the on-chain integer (13 implied decimals).
pub fn dividends_from_raw(raw: U256) -> BigDecimal {
    from_fixed_point(raw, DIVIDENDS_DECIMALS)
}

/// Parses the base FX rate string; empty or malformed strings yield `0.0`.
pub fn parse_base_fx_rate(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

/// Parses the interest payment date JSON into exactly twelve slots.
///
/// Contracts written by older tooling store single-quoted JSON, so quotes are
/// normalized first. Anything unparsable yields twelve empty slots.
pub fn parse_interest_payment_dates(raw: &str) -> Vec<String> {
    let normalized = raw.replace('\'', "\"");
    let object = if normalized.trim().is_empty() {
        serde_json::Map::new()
    } else {
        match serde_json::from_str::<serde_json::Value>(&normalized) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    };

    (1..=INTEREST_PAYMENT_DATE_SLOTS)
        .map(|slot| {
            object
                .get(&format!("interestPaymentDate{slot}"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Serializes interest payment dates into the on-chain JSON object.
pub fn encode_interest_payment_dates(dates: &[String]) -> Result<String, ValidationError> {
    if dates.len() > INTEREST_PAYMENT_DATE_SLOTS {
        return Err(ValidationError::invalid_field(
            "interest_payment_date",
            format!("at most {INTEREST_PAYMENT_DATE_SLOTS} dates are allowed"),
        ));
    }
    let object: serde_json::Map<String, serde_json::Value> = dates
        .iter()
        .enumerate()
        .map(|(i, date)| {
            (
                format!("interestPaymentDate{}", i + 1),
                serde_json::Value::String(date.clone()),
            )
        })
        .collect();
    Ok(serde_json::Value::Object(object).to_string())
}
