// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Well-known addresses and default settings
//!
//! This module centralizes magic constants used throughout the crate.

use alloy_primitives::Address;

/// The zero address; marks an undeployed token or an unset exchange.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Default ledger node endpoint.
pub const DEFAULT_WEB3_HTTP_PROVIDER: &str = "http://localhost:8545";

/// Default chain id of the permissioned network.
pub const DEFAULT_CHAIN_ID: u64 = 2017;

/// Default gas limit attached to every transaction.
pub const DEFAULT_TX_GAS_LIMIT: u64 = 6_000_000;

/// Gas price on the permissioned network.
pub const GAS_PRICE: u128 = 0;

/// Default receipt wait window in seconds.
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 10;

/// Interval between receipt polls in milliseconds.
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 100;

/// Default number of transport retries for idempotent reads.
pub const DEFAULT_REQUEST_RETRY_COUNT: u32 = 3;

/// Default attribute cache TTL in seconds (12 hours).
pub const DEFAULT_TOKEN_CACHE_TTL_SECS: u64 = 43_200;

/// Default attribute cache TTL jitter in seconds.
pub const DEFAULT_TOKEN_CACHE_TTL_JITTER_SECS: u64 = 0;

/// Maximum number of attribute getters in flight per token read.
pub const ATTRIBUTE_READ_CONCURRENCY: usize = 3;

/// Default currency code for bond face values.
pub const DEFAULT_CURRENCY: &str = "JPY";

/// Number of interest payment date slots on a bond.
pub const INTEREST_PAYMENT_DATE_SLOTS: usize = 12;
