// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for ledger node operations.
//!
//! These errors describe transport-level failures talking to a ledger node.
//! Contract-level failures (reverts) are never represented here; they are
//! decoded into [`ContractRevert`](super::ContractRevert) instead.

/// Errors that can occur while talking to a ledger node.
///
/// # Examples
///
/// ```rust
/// use tokenops::RpcError;
///
/// let error = RpcError::ProviderUrlInvalid("not a url".to_string());
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The configured node URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),

    /// Failed to connect to the node or execute an RPC call.
    ///
    /// This is the catch-all for network errors, HTTP failures, and node
    /// downtime.
    #[error("Chain connection failed during {operation}")]
    ChainConnectionFailed {
        /// Description of the operation that failed (e.g., "eth_call balanceOf")
        operation: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The node answered the request with a JSON-RPC error object.
    #[error("Node returned error {code} during {operation}: {message}")]
    ErrorResponse {
        /// Description of the operation that failed
        operation: String,
        /// JSON-RPC error code
        code: i64,
        /// Message reported by the node (e.g., "nonce too low")
        message: String,
    },

    /// Every configured endpoint failed for the operation.
    #[error("No ledger endpoint available for {operation} ({attempted} attempted)")]
    NoEndpointAvailable {
        /// Description of the operation that failed
        operation: String,
        /// Number of endpoints tried
        attempted: usize,
    },
}

impl RpcError {
    /// Helper to create a `ChainConnectionFailed` error from any error type.
    pub fn chain_connection_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ChainConnectionFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` when the endpoint itself could not be reached.
    ///
    /// JSON-RPC error replies come from a healthy node, so failover does not
    /// move to another endpoint for them.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            RpcError::ChainConnectionFailed { .. } | RpcError::NoEndpointAvailable { .. }
        )
    }
}
