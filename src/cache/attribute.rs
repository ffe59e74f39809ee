// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-through attribute cache with TTL and invalidation markers

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use alloy_primitives::Address;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::{AttributeStore, CacheEntry, CacheStats, InvalidationMarker};
use crate::attributes::{TokenAttributes, TokenKind};
use crate::config::TokenCacheConfig;
use crate::errors::{ReadError, StoreError};

/// Read-through cache of token attribute snapshots
///
/// [`get_or_refresh`](Self::get_or_refresh) serves a stored snapshot only
/// while it is fresh: no marker strictly newer than its `cached_at` and not
/// past its `expires_at`. Otherwise the live fetch runs and its result
/// replaces the entry.
///
/// `cached_at` is taken before the live fetch starts, so a marker recorded
/// while the fetch is in flight still invalidates the stored result.
/// Concurrent refreshes of one token are not deduplicated; the last upsert wins.
pub struct TokenAttributeCache {
    store: Arc<dyn AttributeStore>,
    config: TokenCacheConfig,
    stats: Mutex<CacheStats>,
    // Markers from this process's own writes, kept in case the store lost them
    local_markers: Mutex<HashMap<Address, DateTime<Utc>>>,
}

impl std::fmt::Debug for TokenAttributeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAttributeCache")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenAttributeCache {
    /// Creates a cache over `store`.
    pub fn new(store: Arc<dyn AttributeStore>, config: TokenCacheConfig) -> Self {
        Self {
            store,
            config,
            stats: Mutex::new(CacheStats::default()),
            local_markers: Mutex::new(HashMap::new()),
        }
    }

    /// Whether reads consult the store at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn AttributeStore> {
        &self.store
    }

    /// Returns the snapshot for `token_address`, fetching it live when needed.
    ///
    /// With caching disabled `fetch` always runs and the store is never read
    /// or written. Store failures are logged and treated as a miss; only
    /// `fetch` errors fail the read.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        token_address: Address,
        kind: TokenKind,
        fetch: F,
    ) -> Result<TokenAttributes, ReadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenAttributes, ReadError>>,
    {
        if !self.config.enabled {
            return fetch().await;
        }

        let entry = match self.store.entry(token_address).await {
            Ok(entry) => entry.filter(|entry| entry.attributes.kind() == kind),
            Err(e) => {
                warn!(token_address = %token_address, error = %e, "Cache lookup failed, fetching live");
                None
            }
        };

        let refreshing = entry.is_some();
        if let Some(entry) = entry {
            if self.is_fresh(&entry).await {
                debug!(token_address = %token_address, "Attribute cache hit");
                self.stats.lock().await.hits += 1;
                return Ok(entry.attributes);
            }
            debug!(token_address = %token_address, "Attribute cache entry is stale");
        } else {
            debug!(token_address = %token_address, "Attribute cache miss");
        }

        let cached_at = Utc::now();
        let attributes = fetch().await?;

        {
            let mut stats = self.stats.lock().await;
            if refreshing {
                stats.refreshes += 1;
            } else {
                stats.misses += 1;
            }
        }

        let entry = CacheEntry {
            token_address,
            attributes: attributes.clone(),
            cached_at,
            expires_at: self.expires_at(cached_at),
        };
        if let Err(e) = self.store.upsert_entry(entry).await {
            warn!(token_address = %token_address, error = %e, "Failed to store attribute snapshot");
        }

        Ok(attributes)
    }

    /// Records a marker for `token_address` and drops its entry.
    ///
    /// Called after every successful write. The marker is recorded even when
    /// caching is disabled so other readers of the store see the change. The
    /// entry is dropped and the marker is noted locally even when the store
    /// rejects the marker, so this process never serves the pre-write
    /// snapshot. The first store error is returned.
    pub async fn invalidate(&self, token_address: Address) -> Result<(), StoreError> {
        let marker = InvalidationMarker::now(token_address);
        self.local_markers
            .lock()
            .await
            .insert(token_address, marker.updated_at);

        let dropped = if self.config.enabled {
            self.store.delete_entry(token_address).await
        } else {
            Ok(())
        };
        let recorded = self.store.record_marker(marker).await;
        self.stats.lock().await.invalidations += 1;

        if let Err(e) = &dropped {
            warn!(token_address = %token_address, error = %e, "Failed to drop cache entry");
        }
        recorded.and(dropped)
    }

    /// Records a marker after a write, logging instead of failing.
    pub(crate) async fn invalidate_after_write(&self, token_address: Address) {
        if let Err(e) = self.invalidate(token_address).await {
            error!(
                token_address = %token_address,
                error = %e,
                "Failed to record invalidation marker after successful write"
            );
        }
    }

    /// Returns current cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    async fn is_fresh(&self, entry: &CacheEntry) -> bool {
        let latest_marker = match self.store.latest_marker(entry.token_address).await {
            Ok(marker) => marker,
            Err(e) => {
                warn!(token_address = %entry.token_address, error = %e, "Marker lookup failed, treating entry as stale");
                return false;
            }
        };
        let local_marker = self
            .local_markers
            .lock()
            .await
            .get(&entry.token_address)
            .copied();
        let latest_marker = latest_marker.max(local_marker);
        !entry.is_invalidated_by(latest_marker) && !entry.is_expired(Utc::now())
    }

    /// Expiry for an entry cached at `cached_at`: TTL shifted uniformly by up
    /// to the configured jitter in either direction.
    pub(crate) fn expires_at(&self, cached_at: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = self.config.ttl.as_millis() as i64;
        let jitter = self.config.ttl_jitter.as_millis() as i64;
        let offset = if jitter > 0 {
            fastrand::i64(-jitter..=jitter)
        } else {
            0
        };
        cached_at + Duration::milliseconds(ttl.saturating_add(offset).max(0))
    }
}
