// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Versioned document store abstraction.
//!
//! The activity database is a set of JSON documents on a remote file host
//! that supports conditional writes. The host provides no locks: the
//! version token carried with every read, and required on every write, is
//! the sole concurrency-control primitive.

pub mod http;
pub mod memory;

pub use http::HttpDocumentStore;
pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;

/// Opaque version token for a stored document.
///
/// Tokens are compared byte-for-byte and never parsed. The HTTP binding
/// carries entity tags here, quoting included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A document read from the store, with the version observed.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    pub id: String,
    pub body: String,
    pub version: Version,
}

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Version conflict on document {0}")]
    VersionConflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Versioned CRUD over JSON documents keyed by id.
///
/// `conditional_update` succeeds only while the stored version still
/// equals `expected`; a lost race surfaces as `VersionConflict` and the
/// caller re-reads and retries.
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Fetch a document and its current version.
    async fn get(&self, id: &str) -> Result<DocumentEntry, StoreError>;

    /// Create a document that must not already exist.
    async fn create(&self, id: &str, body: &str) -> Result<Version, StoreError>;

    /// Replace a document if and only if its version is still `expected`.
    async fn conditional_update(
        &self,
        id: &str,
        body: &str,
        expected: &Version,
    ) -> Result<Version, StoreError>;

    /// List every document. Restartable and cursorless; entries created
    /// or deleted mid-listing may or may not appear.
    async fn list(&self) -> Result<Vec<DocumentEntry>, StoreError>;
}
