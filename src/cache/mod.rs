// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token attribute cache and its stores
//!
//! Two tables back the cache, both keyed by token address:
//!
//! - **entries**: one [`CacheEntry`] per token, upserted whole on refresh
//! - **markers**: append-only [`InvalidationMarker`]s, written after every
//!   successful write by this engine and independently by the indexer
//!
//! An entry is stale when a marker is strictly newer than its `cached_at`, or
//! when its `expires_at` has passed. [`TokenAttributeCache`] applies those rules
//! on top of any [`AttributeStore`].
//!
//! Backends:
//!
//! - [`MemoryAttributeStore`]: process-local maps
//! - [`DiskAttributeStore`]: versioned JSON file, written through on every change
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokenops::cache::{DiskAttributeStore, TokenAttributeCache};
//! use tokenops::EngineConfig;
//!
//! let store = Arc::new(DiskAttributeStore::new("token_cache.json").validate()?);
//! let cache = TokenAttributeCache::new(store, EngineConfig::default().cache);
//! ```

use std::fmt;

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::TokenAttributes;
use crate::errors::StoreError;

mod attribute;
mod disk;
mod memory;

pub use attribute::TokenAttributeCache;
pub use disk::DiskAttributeStore;
pub use memory::MemoryAttributeStore;

/// One cached snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Token contract address
    pub token_address: Address,
    /// Snapshot as produced by the last live fetch
    pub attributes: TokenAttributes,
    /// Instant the live fetch that produced `attributes` started
    pub cached_at: DateTime<Utc>,
    /// Instant after which the entry must be refreshed
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Returns `true` if `now` is past the entry's expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns `true` if a marker newer than the snapshot exists.
    pub fn is_invalidated_by(&self, latest_marker: Option<DateTime<Utc>>) -> bool {
        latest_marker.is_some_and(|updated_at| updated_at > self.cached_at)
    }
}

/// Signal that a token's on-chain state changed at `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationMarker {
    /// Token contract address
    pub token_address: Address,
    /// When the change was recorded
    pub updated_at: DateTime<Utc>,
}

impl InvalidationMarker {
    /// Marker for `token_address` stamped with the current time.
    pub fn now(token_address: Address) -> Self {
        Self {
            token_address,
            updated_at: Utc::now(),
        }
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found no entry
    pub misses: u64,
    /// Reads that found a stale entry and fetched again
    pub refreshes: u64,
    /// Markers recorded through the cache
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.refreshes;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, refreshes={}, invalidations={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.refreshes,
            self.invalidations,
            self.hit_rate()
        )
    }
}

/// Row counts reported by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of cache entries
    pub entries: usize,
    /// Number of invalidation markers
    pub markers: usize,
}

/// Storage for cache entries and invalidation markers
///
/// # Thread Safety
///
/// Stores are shared across tasks behind an `Arc` and must be `Send + Sync`.
/// Concurrent upserts of the same token are last-write-wins.
///
/// # Error Handling
///
/// Store failures are returned to [`TokenAttributeCache`], which logs them and
/// degrades to a live fetch. They never fail a read.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// The entry for `token_address`, if any.
    async fn entry(&self, token_address: Address) -> Result<Option<CacheEntry>, StoreError>;

    /// Inserts or replaces the entry for `entry.token_address`.
    async fn upsert_entry(&self, entry: CacheEntry) -> Result<(), StoreError>;

    /// Removes the entry for `token_address`; a missing entry is not an error.
    async fn delete_entry(&self, token_address: Address) -> Result<(), StoreError>;

    /// The newest marker timestamp for `token_address`.
    async fn latest_marker(
        &self,
        token_address: Address,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Appends a marker.
    async fn record_marker(&self, marker: InvalidationMarker) -> Result<(), StoreError>;

    /// Current row counts.
    async fn stats(&self) -> StoreStats;

    /// Returns a human-readable name for this store
    fn name(&self) -> &'static str;
}
