// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Ledger node providers
//!
//! The engine talks to nodes through alloy's `Provider<AnyNetwork>`. The
//! permissioned network is EVM compatible but not a named chain, so no
//! network-specific receipt or transaction types are assumed.
//!
//! - [`create_http_provider`]: HTTP provider with the retry and logging layers
//! - [`connect_ledger`]: a ready [`LedgerClient`](crate::ledger::LedgerClient)
//!   for the configured primary and standby endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use tokenops::provider::connect_ledger;
//! use tokenops::EngineConfig;
//!
//! let config = EngineConfig::from_env()?;
//! let ledger = connect_ledger(&config.ledger)?;
//! ```

mod factory;

pub use factory::{connect_ledger, create_http_provider};

use alloy_network::AnyNetwork;

/// HTTP provider over `AnyNetwork`
pub type AnyHttpProvider = alloy_provider::RootProvider<AnyNetwork>;
