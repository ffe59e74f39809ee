// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider and ledger client construction

use std::sync::Arc;

use alloy_network::AnyNetwork;
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::ClientBuilder;
use tracing::info;

use crate::config::LedgerEndpointConfig;
use crate::errors::RpcError;
use crate::ledger::{AlloyLedger, FailoverLedger, LedgerClient};
use crate::transport::{LoggingLayer, RetryLayer};

use super::AnyHttpProvider;

/// Create an HTTP provider for one node URL
///
/// The transport is wrapped in a [`RetryLayer`] sized by
/// `config.request_retry_count` and, when `config.logging_enabled` is set, a
/// [`LoggingLayer`]. Recommended fillers are disabled: the engine fills
/// nonce, gas, and chain id itself and signs locally.
///
/// # Examples
///
/// ```rust,ignore
/// use tokenops::provider::create_http_provider;
/// use tokenops::EngineConfig;
///
/// let config = EngineConfig::default();
/// let provider = create_http_provider(&config.ledger.url, &config.ledger)?;
/// ```
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if `url` cannot be parsed.
pub fn create_http_provider(
    url: &str,
    config: &LedgerEndpointConfig,
) -> Result<AnyHttpProvider, RpcError> {
    let url: url::Url = url
        .parse()
        .map_err(|e| RpcError::ProviderUrlInvalid(format!("{url}: {e}")))?;

    let retry = RetryLayer::with_max_retries(config.request_retry_count);

    if config.logging_enabled {
        let client = ClientBuilder::default()
            .layer(retry)
            .layer(LoggingLayer::new())
            .http(url);

        Ok(ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<AnyNetwork>()
            .connect_client(client))
    } else {
        let client = ClientBuilder::default().layer(retry).http(url);

        Ok(ProviderBuilder::new()
            .disable_recommended_fillers()
            .network::<AnyNetwork>()
            .connect_client(client))
    }
}

/// Connect to the configured ledger endpoints
///
/// With no standby URLs this is a single [`AlloyLedger`]; otherwise the
/// primary and standbys are wrapped in a [`FailoverLedger`] in configuration
/// order.
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if any URL cannot be parsed.
pub fn connect_ledger(config: &LedgerEndpointConfig) -> Result<Arc<dyn LedgerClient>, RpcError> {
    let mut endpoints: Vec<Arc<dyn LedgerClient>> = Vec::new();
    for url in config.all_urls() {
        let provider = create_http_provider(url, config)?;
        endpoints.push(Arc::new(AlloyLedger::new(provider, url)));
    }

    if endpoints.len() == 1 {
        return endpoints
            .pop()
            .ok_or_else(|| RpcError::ProviderUrlInvalid("no ledger endpoint configured".into()));
    }

    info!(endpoints = endpoints.len(), "Ledger failover enabled");
    FailoverLedger::new(endpoints)
        .map(|ledger| Arc::new(ledger) as Arc<dyn LedgerClient>)
        .ok_or_else(|| RpcError::ProviderUrlInvalid("no ledger endpoint configured".into()))
}
