// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the tokenops library.
//!
//! This module follows a hybrid approach:
//!
//! - **Concern-specific errors** for fine-grained handling ([`TransactionError`],
//!   [`ReadError`], [`StoreError`], ...)
//! - **Unified error type** ([`EngineError`]) for callers that do not need to
//!   distinguish between error sources
//!
//! # Architecture
//!
//! - [`TransactionError`] - the only error a write returns; one of
//!   [`ContractRevert`], [`SendTransactionError`], or [`ValidationError`]
//! - [`ReadError`] - attribute, balance, lock, and application reads
//! - [`StoreError`] - cache and invalidation marker backends
//! - [`ConfigError`] - environment configuration
//! - [`ApprovalStateError`] - illegal transfer application transitions
//!
//! [`RpcError`] carries transport failures shared by all of the above.
//!
//! # Examples
//!
//! ```rust,ignore
//! use tokenops::{TransactionError, SendTransactionError};
//!
//! match bond.forced_transfer(&params, &signer).await {
//!     Ok(outcome) => println!("mined in block {}", outcome.receipt.block_number),
//!     Err(TransactionError::ContractRevert(revert)) => eprintln!("{}", revert.message),
//!     Err(TransactionError::Send(err)) if err.outcome_unknown() => {
//!         eprintln!("outcome unknown, reconcile later: {err}");
//!     }
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod approval;
mod config;
mod read;
mod rpc;
mod store;
mod transaction;
mod validation;

pub use approval::ApprovalStateError;
pub use config::ConfigError;
pub use read::ReadError;
pub use rpc::RpcError;
pub use store::StoreError;
pub use transaction::{ContractRevert, SendTransactionError, TransactionError};
pub use validation::ValidationError;

/// Unified error type for all tokenops operations.
///
/// All concern-specific error types convert to `EngineError` via `From`, so
/// `?` propagates naturally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Error from a state-changing transaction.
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Error from an on-chain read.
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Error from a cache backend.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a transport or provider setup.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Error from a transfer application transition.
    #[error("Approval state error: {0}")]
    ApprovalState(#[from] ApprovalStateError),
}
