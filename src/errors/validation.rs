// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for operation intents rejected before any network call.

use alloy_primitives::Address;

/// Reasons an operation intent is rejected locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An amount that must be strictly positive was zero.
    #[error("{field} must be greater than zero")]
    NonPositiveAmount {
        /// Name of the offending field
        field: &'static str,
    },

    /// A bulk operation received no items.
    #[error("{operation} requires at least one item")]
    EmptyBatch {
        /// Name of the bulk operation
        operation: &'static str,
    },

    /// Parallel columns of a bulk operation have different lengths.
    #[error("{operation}: column lengths differ ({left} vs {right})")]
    ColumnLengthMismatch {
        /// Name of the bulk operation
        operation: &'static str,
        /// Length of the first column
        left: usize,
        /// Length of the mismatching column
        right: usize,
    },

    /// The zero address was given where a real account is required.
    #[error("{field} must not be the zero address")]
    ZeroAddress {
        /// Name of the offending field
        field: &'static str,
    },

    /// The handle already points at a deployed contract.
    #[error("Contract is already deployed at {0}")]
    AlreadyDeployed(Address),

    /// The handle has no contract address yet.
    #[error("Token contract is not deployed")]
    NotDeployed,

    /// A field value is outside its accepted range.
    #[error("{field} is invalid: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// Human readable reason
        reason: String,
    },

    /// The operation is not available for this application.
    #[error("{0}")]
    Unsupported(String),
}

impl ValidationError {
    /// Helper to create an `InvalidField` error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
