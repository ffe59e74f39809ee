// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for tokenops operations.
//!
//! Telemetry stays out of the business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here and the
//! operation attaches it to its future.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_primitives::{Address, U256};
use tracing::{Level, Span};

use crate::attributes::TokenKind;

/// Create span for one signed transaction, from nonce lookup to receipt.
///
/// Parent: the write operation that built the call
/// Children: RPC request spans from the logging layer
#[inline]
pub(crate) fn submit_transaction(label: &'static str, to: Option<Address>, from: Address) -> Span {
    match to {
        Some(to) => tracing::debug_span!(
            "tokenops.submit_transaction",
            call = label,
            to = %to,
            from = %from,
        ),
        None => tracing::debug_span!(
            "tokenops.submit_transaction",
            call = label,
            to = "create",
            from = %from,
        ),
    }
}

/// Create span for a single-item write against a token.
///
/// Parent: None (root span for this operation)
/// Children: submit_transaction span
#[inline]
pub(crate) fn token_write(operation: &'static str, token_address: Address) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.token_write",
        operation = operation,
        token_address = %token_address,
    )
}

/// Create span for a columnar bulk write.
///
/// Parent: None (root span for this operation)
/// Children: submit_transaction span
#[inline]
pub(crate) fn bulk_operation(operation: &'static str, token_address: Address, items: usize) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.bulk_operation",
        operation = operation,
        token_address = %token_address,
        items = items,
    )
}

/// Create span for a lock family write.
#[inline]
pub(crate) fn lock_operation(
    operation: &'static str,
    token_address: Address,
    lock_address: Address,
) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.lock_operation",
        operation = operation,
        token_address = %token_address,
        lock_address = %lock_address,
    )
}

/// Create span for approving or cancelling a transfer application.
#[inline]
pub(crate) fn transfer_approval(
    operation: &'static str,
    token_address: Address,
    application_id: U256,
) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.transfer_approval",
        operation = operation,
        token_address = %token_address,
        application_id = %application_id,
    )
}

/// Create span for deploying a token contract.
///
/// Parent: None (root span for this operation)
/// Children: submit_transaction span
#[inline]
pub(crate) fn create_token(kind: TokenKind, issuer: Address) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.create_token",
        kind = %kind,
        issuer = %issuer,
    )
}

/// Create span for applying an attribute update as a sequence of setters.
///
/// Parent: None (root span for this operation)
/// Children: one submit_transaction span per setter
#[inline]
pub(crate) fn update_token(kind: TokenKind, token_address: Address, setters: usize) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.update_token",
        kind = %kind,
        token_address = %token_address,
        setters = setters,
    )
}

/// Create span for reading a token attribute snapshot through the cache.
///
/// Parent: None (root span for this operation)
/// Children: fetch_attributes span on a miss
#[inline]
pub(crate) fn get_token(kind: TokenKind, token_address: Address) -> Span {
    tracing::span!(
        Level::INFO,
        "tokenops.get_token",
        kind = %kind,
        token_address = %token_address,
    )
}

/// Create span for the live attribute getters of one token.
///
/// Parent: get_token span
/// Children: RPC request spans from the logging layer
#[inline]
pub(crate) fn fetch_attributes(kind: TokenKind, token_address: Address) -> Span {
    tracing::debug_span!(
        "tokenops.fetch_attributes",
        kind = %kind,
        token_address = %token_address,
    )
}

/// Create span for an account balance read.
#[inline]
pub(crate) fn get_account_balance(token_address: Address, account_address: Address) -> Span {
    tracing::debug_span!(
        "tokenops.get_account_balance",
        token_address = %token_address,
        account_address = %account_address,
    )
}
