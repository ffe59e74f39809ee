// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory attribute store

use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::trace;

use super::{AttributeStore, CacheEntry, InvalidationMarker, StoreStats};
use crate::errors::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<Address, CacheEntry>,
    markers: HashMap<Address, Vec<DateTime<Utc>>>,
}

/// Process-local [`AttributeStore`]
///
/// Suitable for a single engine instance and for tests. Markers written by an
/// external indexer are only visible if the indexer writes through the same
/// instance.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use tokenops::cache::{MemoryAttributeStore, TokenAttributeCache};
/// use tokenops::EngineConfig;
///
/// let cache = TokenAttributeCache::new(
///     Arc::new(MemoryAttributeStore::new()),
///     EngineConfig::default().cache,
/// );
/// ```
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    state: Mutex<MemoryState>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttributeStore for MemoryAttributeStore {
    async fn entry(&self, token_address: Address) -> Result<Option<CacheEntry>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.entries.get(&token_address).cloned())
    }

    async fn upsert_entry(&self, entry: CacheEntry) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        trace!(token_address = %entry.token_address, "Upserting cache entry (memory)");
        state.entries.insert(entry.token_address, entry);
        Ok(())
    }

    async fn delete_entry(&self, token_address: Address) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.entries.remove(&token_address);
        Ok(())
    }

    async fn latest_marker(
        &self,
        token_address: Address,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .markers
            .get(&token_address)
            .and_then(|markers| markers.iter().max().copied()))
    }

    async fn record_marker(&self, marker: InvalidationMarker) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state
            .markers
            .entry(marker.token_address)
            .or_default()
            .push(marker.updated_at);
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        let state = self.state.lock().await;
        StoreStats {
            entries: state.entries.len(),
            markers: state.markers.values().map(Vec::len).sum(),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
