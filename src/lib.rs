// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Operation engine for security token contracts (bonds and shares) on a
//! permissioned EVM ledger.
//!
//! - [`submitter`]: build, simulate, sign, send, and confirm one transaction
//! - [`revert`]: numeric revert codes to domain messages
//! - [`cache`]: read-through attribute cache with TTL and invalidation markers
//! - [`bulk`]: columnar all-or-nothing bulk writes
//! - [`lock`]: locked balances
//! - [`approval`]: transfer approval workflow
//! - [`token`]: per-token handles tying the above together

pub mod approval;
pub mod attributes;
pub mod bulk;
pub mod cache;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod ledger;
pub mod lock;
pub mod params;
pub mod provider;
mod reader;
pub mod revert;
pub mod signer;
mod spans;
pub mod submitter;
pub mod token;
pub mod transport;

pub use attributes::{BondAttributes, CommonAttributes, ShareAttributes, TokenAttributes, TokenKind};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use errors::*;
pub use ledger::{CallOutcome, LedgerClient, Receipt};
pub use signer::TransactionSigner;
pub use submitter::{ContractCall, TransactionSubmitter, TxOutcome};
pub use token::{BondToken, SecurityToken, ShareToken, TokenEngine};
