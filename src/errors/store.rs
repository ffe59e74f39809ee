// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the attribute cache and invalidation marker stores.

/// Errors raised by [`AttributeStore`](crate::cache::AttributeStore) backends.
///
/// Store failures never fail a read: the attribute cache logs them and falls
/// back to a live fetch.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Cache I/O error at {path}")]
    Io {
        /// Path or description of the failing resource
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Cached data could not be (de)serialized.
    #[error("Cache serialization failed")]
    Serialization {
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Helper to create an `Io` error.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Helper to create a `Serialization` error.
    pub fn serialization(source: serde_json::Error) -> Self {
        StoreError::Serialization { source }
    }
}
