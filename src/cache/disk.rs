// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Disk-based attribute store with file locking and versioning

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{AttributeStore, CacheEntry, InvalidationMarker, StoreStats};
use crate::errors::StoreError;

/// Current store format version
const STORE_VERSION: u32 = 1;

/// Serialized store format (versioned)
///
/// Keys are address strings for JSON compatibility.
#[derive(Debug, Serialize, Deserialize)]
struct StoreData {
    version: u32,
    #[serde(default)]
    entries: HashMap<String, CacheEntry>,
    #[serde(default)]
    markers: HashMap<String, Vec<DateTime<Utc>>>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            entries: HashMap::new(),
            markers: HashMap::new(),
        }
    }
}

fn key(token_address: Address) -> String {
    token_address.to_string()
}

/// [`AttributeStore`] persisted to a JSON file
///
/// Every change is written through with a uniquely named temp file and an
/// atomic rename, so the cache and the marker history survive restarts and can
/// be shared by processes on one host. Markers written by another process into
/// the same file are picked up on the next read.
///
/// # Examples
///
/// ```rust,ignore
/// use tokenops::cache::DiskAttributeStore;
///
/// let store = DiskAttributeStore::new("/var/cache/tokenops/attributes.json").validate()?;
/// ```
///
/// # File Locking
///
/// A sibling `<file>.lock` carries an advisory lock (std, Rust 1.89+): shared
/// for reads, exclusive for the whole load-modify-save cycle. Lock waits run
/// on the blocking pool.
#[derive(Debug)]
pub struct DiskAttributeStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl DiskAttributeStore {
    /// Creates a store at `path`; the file is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates the store path and creates the parent directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or is not writable.
    pub fn validate(self) -> Result<Self, StoreError> {
        let parent = parent_dir(&self.path);

        if !parent.exists() {
            std::fs::create_dir_all(&parent)
                .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
            debug!(path = %parent.display(), "Created store directory");
        }

        let test_file = parent.join(".tokenops_write_test");
        std::fs::write(&test_file, b"test")
            .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
        let _ = std::fs::remove_file(&test_file);

        debug!(path = %self.path.display(), "Store path validated successfully");
        Ok(self)
    }

    /// Runs `f` over the stored data under a shared lock.
    async fn read<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(StoreData) -> R + Send + 'static,
        R: Send + 'static,
    {
        let _guard = self.guard.lock().await;
        let path = self.path.clone();
        run_blocking(&self.path, move || {
            if !path.exists() {
                return Ok(f(StoreData::default()));
            }
            let lock = open_lock(&path)?;
            lock.lock_shared()
                .map_err(|e| StoreError::io(lock_path(&path).display().to_string(), e))?;
            let data = load(&path)?;
            drop(lock);
            Ok(f(data))
        })
        .await
    }

    /// Loads, applies `f`, and saves under an exclusive lock.
    ///
    /// `f` returns whether it changed anything; unchanged data is not
    /// rewritten. Unreadable data is discarded with a warning.
    async fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreData) -> bool + Send + 'static,
    {
        let _guard = self.guard.lock().await;
        let path = self.path.clone();
        run_blocking(&self.path, move || {
            let parent = parent_dir(&path);
            if !parent.exists() {
                std::fs::create_dir_all(&parent)
                    .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
            }

            let lock = open_lock(&path)?;
            lock.lock()
                .map_err(|e| StoreError::io(lock_path(&path).display().to_string(), e))?;

            let mut data = if path.exists() {
                load(&path).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable store file");
                    StoreData::default()
                })
            } else {
                StoreData::default()
            };
            if f(&mut data) {
                save(&path, &data)?;
            }
            drop(lock);
            Ok(())
        })
        .await
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock(path: &Path) -> Result<File, StoreError> {
    let lock_path = lock_path(path);
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| StoreError::io(lock_path.display().to_string(), e))
}

async fn run_blocking<R, F>(path: &Path, f: F) -> Result<R, StoreError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::io(path.display().to_string(), std::io::Error::other(e)))?
}

/// Reads the data file; the caller holds the lock.
fn load(path: &Path) -> Result<StoreData, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path.display().to_string(), e))?;
    let data: StoreData =
        serde_json::from_reader(BufReader::new(file)).map_err(StoreError::serialization)?;

    if data.version != STORE_VERSION {
        warn!(
            path = %path.display(),
            stored_version = data.version,
            current_version = STORE_VERSION,
            "Store version mismatch, ignoring stored data"
        );
        return Ok(StoreData::default());
    }
    Ok(data)
}

/// Writes a temp file next to `path` and renames it over `path`; the caller
/// holds the exclusive lock.
fn save(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let parent = parent_dir(path);
    let mut temp = NamedTempFile::new_in(&parent)
        .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
    serde_json::to_writer_pretty(&mut temp, data).map_err(StoreError::serialization)?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(temp.path().display().to_string(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io(path.display().to_string(), e.error))?;

    debug!(
        path = %path.display(),
        entries = data.entries.len(),
        "Saved attribute store"
    );
    Ok(())
}

#[async_trait]
impl AttributeStore for DiskAttributeStore {
    async fn entry(&self, token_address: Address) -> Result<Option<CacheEntry>, StoreError> {
        let key = key(token_address);
        self.read(move |data| data.entries.get(&key).cloned()).await
    }

    async fn upsert_entry(&self, entry: CacheEntry) -> Result<(), StoreError> {
        self.update(move |data| {
            data.entries.insert(key(entry.token_address), entry);
            true
        })
        .await
    }

    async fn delete_entry(&self, token_address: Address) -> Result<(), StoreError> {
        let key = key(token_address);
        self.update(move |data| data.entries.remove(&key).is_some())
            .await
    }

    async fn latest_marker(
        &self,
        token_address: Address,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let key = key(token_address);
        self.read(move |data| {
            data.markers
                .get(&key)
                .and_then(|markers| markers.iter().max().copied())
        })
        .await
    }

    async fn record_marker(&self, marker: InvalidationMarker) -> Result<(), StoreError> {
        self.update(move |data| {
            data.markers
                .entry(key(marker.token_address))
                .or_default()
                .push(marker.updated_at);
            true
        })
        .await?;
        info!(token_address = %marker.token_address, "Recorded invalidation marker");
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        let counted = self
            .read(|data| StoreStats {
                entries: data.entries.len(),
                markers: data.markers.values().map(Vec::len).sum(),
            })
            .await;
        counted.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load store for stats");
            StoreStats::default()
        })
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
