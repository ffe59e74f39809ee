// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer utilities for the ledger node connection.
//!
//! Tower middleware stacked under the alloy RPC client:
//!
//! - [`RetryLayer`]: exponential backoff for idempotent reads; transaction
//!   submission is passed through exactly once
//! - [`LoggingLayer`]: per-request tracing spans with method and duration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tokenops::transport::{LoggingLayer, RetryLayer};
//! use alloy_rpc_client::ClientBuilder;
//!
//! let client = ClientBuilder::default()
//!     .layer(RetryLayer::with_max_retries(3))
//!     .layer(LoggingLayer::new())
//!     .http(node_url);
//! ```
//!
//! [`crate::provider::create_http_provider`] assembles this stack from an
//! [`LedgerEndpointConfig`](crate::config::LedgerEndpointConfig).

mod logging;
mod retry;

pub use logging::{LoggingLayer, LoggingService};
pub use retry::{RetryConfig, RetryLayer, RetryLayerBuilder, RetryService};
