// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP binding of the versioned store.
//!
//! One JSON document per activity under `{base_url}/{id}.json`. The
//! host's entity tags are the version tokens; conditional writes use
//! `If-Match` / `If-None-Match`, and a lost race comes back as 412.

use super::{DocumentEntry, StoreError, Version, VersionedStore};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::time::Duration;

/// Parallel document fetches during a listing.
const LIST_FETCH_CONCURRENCY: usize = 8;

/// Client for a remote file host speaking conditional HTTP.
#[derive(Clone)]
pub struct HttpDocumentStore {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpDocumentStore {
    /// Build a client for the host at `base_url`.
    ///
    /// Every request carries `timeout` as its round-trip budget and, when
    /// configured, the bearer `auth_token`.
    pub fn new(
        base_url: String,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}.json", self.base_url, urlencoding::encode(id))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Pull the entity tag off a response.
    ///
    /// A host that answers 2xx without a tag cannot do conditional writes,
    /// which makes it unusable as the activity store.
    fn etag_of(response: &reqwest::Response, id: &str) -> Result<Version, StoreError> {
        let raw = response.headers().get(ETAG).ok_or_else(|| {
            StoreError::Unavailable(format!("host returned no entity tag for document {}", id))
        })?;
        let tag = raw.to_str().map_err(|_| {
            StoreError::Unavailable(format!("unreadable entity tag for document {}", id))
        })?;

        Ok(Version::new(tag))
    }

    async fn unexpected_status(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::Unavailable(format!("HTTP {}: {}", status, body))
    }
}

#[async_trait]
impl VersionedStore for HttpDocumentStore {
    async fn get(&self, id: &str) -> Result<DocumentEntry, StoreError> {
        let response = self
            .authorized(self.http.get(self.document_url(id)))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            status if status.is_success() => {
                let version = Self::etag_of(&response, id)?;
                let body = response
                    .text()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                Ok(DocumentEntry {
                    id: id.to_string(),
                    body,
                    version,
                })
            }
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn create(&self, id: &str, body: &str) -> Result<Version, StoreError> {
        let response = self
            .authorized(self.http.put(self.document_url(id)))
            .header(IF_NONE_MATCH, "*")
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => Err(StoreError::AlreadyExists(id.to_string())),
            status if status.is_success() => Self::etag_of(&response, id),
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn conditional_update(
        &self,
        id: &str,
        body: &str,
        expected: &Version,
    ) -> Result<Version, StoreError> {
        let response = self
            .authorized(self.http.put(self.document_url(id)))
            .header(IF_MATCH, expected.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => Err(StoreError::VersionConflict(id.to_string())),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            status if status.is_success() => Self::etag_of(&response, id),
            _ => Err(Self::unexpected_status(response).await),
        }
    }

    async fn list(&self) -> Result<Vec<DocumentEntry>, StoreError> {
        let response = self
            .authorized(self.http.get(format!("{}/", self.base_url)))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::unexpected_status(response).await);
        }

        let names: Vec<String> = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("listing parse error: {}", e)))?;

        let ids: Vec<String> = names
            .iter()
            .filter_map(|name| name.strip_suffix(".json"))
            .map(str::to_string)
            .collect();

        let mut fetches = stream::iter(ids)
            .map(|id| async move { self.get(&id).await })
            .buffer_unordered(LIST_FETCH_CONCURRENCY);

        let mut entries = Vec::new();
        while let Some(fetched) = fetches.next().await {
            match fetched {
                Ok(entry) => entries.push(entry),
                Err(StoreError::NotFound(id)) => {
                    tracing::debug!(id = %id, "Document vanished between listing and fetch");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(entries)
    }
}
