// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for token operations
//!
//! This module controls the ledger endpoint, transaction parameters, and the
//! attribute cache. Values can be set programmatically through
//! [`EngineConfigBuilder`] or loaded from the environment (and a `.env` file)
//! with [`EngineConfig::from_env`].
//!
//! # Example: Using defaults
//!
//! ```rust
//! use tokenops::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.transaction.chain_id, 2017);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use tokenops::EngineConfigBuilder;
//! use std::time::Duration;
//!
//! let config = EngineConfigBuilder::with_defaults()
//!     .url("http://quorum-validator-1:8545")
//!     .standby_url("http://quorum-validator-2:8545")
//!     .receipt_timeout(Duration::from_secs(30))
//!     .cache_ttl(Duration::from_secs(3600))
//!     .build();
//! ```
//!
//! # Environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `WEB3_HTTP_PROVIDER` | `http://localhost:8545` |
//! | `WEB3_HTTP_PROVIDER_STANDBY` | none (comma separated list) |
//! | `WEB3_REQUEST_RETRY_COUNT` | 3 |
//! | `CHAIN_ID` | 2017 |
//! | `TX_GAS_LIMIT` | 6000000 |
//! | `TX_RECEIPT_TIMEOUT` | 10 (seconds) |
//! | `TOKEN_CACHE` | enabled unless `"0"` |
//! | `TOKEN_CACHE_TTL` | 43200 (seconds) |
//! | `TOKEN_CACHE_TTL_JITTER` | 0 (seconds) |

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::errors::ConfigError;

pub mod constants;

use constants::*;

/// Top-level configuration for a [`TokenEngine`](crate::TokenEngine).
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Ledger node endpoints and transport behavior
    pub ledger: LedgerEndpointConfig,
    /// Parameters attached to every transaction
    pub transaction: TransactionConfig,
    /// Attribute cache behavior
    pub cache: TokenCacheConfig,
}

/// Ledger node endpoints and transport behavior.
#[derive(Debug, Clone)]
pub struct LedgerEndpointConfig {
    /// Primary node URL
    pub url: String,
    /// Standby node URLs, tried in order when the active one is unreachable
    pub standby_urls: Vec<String>,
    /// Transport retries for idempotent reads
    pub request_retry_count: u32,
    /// Whether to wrap the transport in the request logging layer
    pub logging_enabled: bool,
}

impl Default for LedgerEndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEB3_HTTP_PROVIDER.to_string(),
            standby_urls: Vec::new(),
            request_retry_count: DEFAULT_REQUEST_RETRY_COUNT,
            logging_enabled: true,
        }
    }
}

impl LedgerEndpointConfig {
    /// Primary URL followed by standby URLs.
    pub fn all_urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str()).chain(self.standby_urls.iter().map(String::as_str))
    }
}

/// Parameters attached to every transaction.
#[derive(Debug, Clone)]
pub struct TransactionConfig {
    /// Chain id used for replay protection
    pub chain_id: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Gas price (zero on the permissioned network)
    pub gas_price: u128,
    /// How long to wait for a receipt before reporting an unknown outcome
    pub receipt_timeout: Duration,
    /// Interval between receipt polls
    pub receipt_poll_interval: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_TX_GAS_LIMIT,
            gas_price: GAS_PRICE,
            receipt_timeout: Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS),
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
        }
    }
}

/// Attribute cache behavior.
#[derive(Debug, Clone)]
pub struct TokenCacheConfig {
    /// When false, every read goes to the ledger and the store is never touched
    pub enabled: bool,
    /// Lifetime of a cache entry
    pub ttl: Duration,
    /// Entries expire uniformly within `ttl ± ttl_jitter`
    pub ttl_jitter: Duration,
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TOKEN_CACHE_TTL_SECS),
            ttl_jitter: Duration::from_secs(DEFAULT_TOKEN_CACHE_TTL_JITTER_SECS),
        }
    }
}

impl EngineConfig {
    /// Create config with the network defaults.
    pub fn with_common_defaults() -> Self {
        Self::default()
    }

    /// Create config without transport retries, request logging, or caching.
    ///
    /// Suitable for tests against a local node.
    pub fn minimal() -> Self {
        Self {
            ledger: LedgerEndpointConfig {
                request_retry_count: 0,
                logging_enabled: false,
                ..Default::default()
            },
            transaction: TransactionConfig::default(),
            cache: TokenCacheConfig {
                enabled: false,
                ..Default::default()
            },
        }
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is read first if
    /// present; variables already set in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("WEB3_HTTP_PROVIDER") {
            config.ledger.url = url.trim().to_string();
        }
        if let Some(standby) = get("WEB3_HTTP_PROVIDER_STANDBY") {
            config.ledger.standby_urls = standby
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = get("WEB3_REQUEST_RETRY_COUNT") {
            config.ledger.request_retry_count = parse("WEB3_REQUEST_RETRY_COUNT", &value)?;
        }
        if let Some(value) = get("CHAIN_ID") {
            config.transaction.chain_id = parse("CHAIN_ID", &value)?;
        }
        if let Some(value) = get("TX_GAS_LIMIT") {
            config.transaction.gas_limit = parse("TX_GAS_LIMIT", &value)?;
        }
        if let Some(value) = get("TX_RECEIPT_TIMEOUT") {
            config.transaction.receipt_timeout =
                Duration::from_secs(parse("TX_RECEIPT_TIMEOUT", &value)?);
        }
        if let Some(value) = lookup("TOKEN_CACHE") {
            config.cache.enabled = value.trim() != "0";
        }
        if let Some(value) = get("TOKEN_CACHE_TTL") {
            config.cache.ttl = Duration::from_secs(parse("TOKEN_CACHE_TTL", &value)?);
        }
        if let Some(value) = get("TOKEN_CACHE_TTL_JITTER") {
            config.cache.ttl_jitter =
                Duration::from_secs(parse("TOKEN_CACHE_TTL_JITTER", &value)?);
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid_value(key, value, e))
}

/// Builder for [`EngineConfig`]
///
/// # Example
///
/// ```rust
/// use tokenops::EngineConfigBuilder;
///
/// let config = EngineConfigBuilder::new()
///     .chain_id(1500)
///     .cache_enabled(true)
///     .build();
/// assert_eq!(config.transaction.chain_id, 1500);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: EngineConfig::minimal(),
        }
    }

    /// Start with common defaults
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::with_common_defaults(),
        }
    }

    /// Set the primary node URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.ledger.url = url.into();
        self
    }

    /// Append a standby node URL
    pub fn standby_url(mut self, url: impl Into<String>) -> Self {
        self.config.ledger.standby_urls.push(url.into());
        self
    }

    /// Set the transport retry count for reads
    pub fn request_retry_count(mut self, count: u32) -> Self {
        self.config.ledger.request_retry_count = count;
        self
    }

    /// Enable or disable the request logging layer
    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.ledger.logging_enabled = enabled;
        self
    }

    /// Set the chain id
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.transaction.chain_id = chain_id;
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.config.transaction.gas_limit = gas_limit;
        self
    }

    /// Set the receipt wait window
    pub fn receipt_timeout(mut self, timeout: Duration) -> Self {
        self.config.transaction.receipt_timeout = timeout;
        self
    }

    /// Set the receipt poll interval
    pub fn receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.config.transaction.receipt_poll_interval = interval;
        self
    }

    /// Enable or disable the attribute cache
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    /// Set the attribute cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.ttl = ttl;
        self
    }

    /// Set the attribute cache TTL jitter
    pub fn cache_ttl_jitter(mut self, jitter: Duration) -> Self {
        self.config.cache.ttl_jitter = jitter;
        self
    }

    /// Build the configuration
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
