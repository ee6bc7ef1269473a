// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for tests and local development.

use super::{DocumentEntry, StoreError, Version, VersionedStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Map-backed store with a process-local revision counter as the version.
///
/// Compare-and-swap runs under the per-key write guard, so two updates
/// racing on one document serialize and the loser sees `VersionConflict`,
/// exactly as the remote host behaves.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: DashMap<String, (String, u64)>,
    revision: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl VersionedStore for InMemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<DocumentEntry, StoreError> {
        let entry = self
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let (body, revision) = entry.value();

        Ok(DocumentEntry {
            id: id.to_string(),
            body: body.clone(),
            version: Version::new(revision.to_string()),
        })
    }

    async fn create(&self, id: &str, body: &str) -> Result<Version, StoreError> {
        match self.documents.entry(id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                let revision = self.next_revision();
                slot.insert((body.to_string(), revision));
                Ok(Version::new(revision.to_string()))
            }
        }
    }

    async fn conditional_update(
        &self,
        id: &str,
        body: &str,
        expected: &Version,
    ) -> Result<Version, StoreError> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let (stored_body, stored_revision) = entry.value_mut();

        if stored_revision.to_string() != expected.as_str() {
            return Err(StoreError::VersionConflict(id.to_string()));
        }

        let revision = self.next_revision();
        *stored_body = body.to_string();
        *stored_revision = revision;
        Ok(Version::new(revision.to_string()))
    }

    async fn list(&self) -> Result<Vec<DocumentEntry>, StoreError> {
        Ok(self
            .documents
            .iter()
            .map(|entry| {
                let (body, revision) = entry.value();
                DocumentEntry {
                    id: entry.key().clone(),
                    body: body.clone(),
                    version: Version::new(revision.to_string()),
                }
            })
            .collect())
    }
}
