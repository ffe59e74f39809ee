// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for on-chain reads.

use alloy_primitives::Address;

use super::RpcError;

/// Errors returned by read operations (attributes, balances, locks, applications).
///
/// Reverting getters fall back to their defaults and never produce this error;
/// only transport failures do.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The ledger node could not serve the read.
    #[error("Ledger unavailable while reading {operation} of token {token_address}")]
    ServiceUnavailable {
        /// What was being read (e.g., "attributes", "balanceOf")
        operation: &'static str,
        /// Token contract address
        token_address: Address,
        /// The underlying RPC error
        #[source]
        source: RpcError,
    },
}

impl ReadError {
    /// Helper to create a `ServiceUnavailable` error.
    pub fn service_unavailable(
        operation: &'static str,
        token_address: Address,
        source: RpcError,
    ) -> Self {
        ReadError::ServiceUnavailable {
            operation,
            token_address,
            source,
        }
    }
}
