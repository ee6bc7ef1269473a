// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed activity persistence over the versioned store.
//!
//! All mutation goes through `apply`: read the current revision, run a
//! pure mutation function against it, write back conditionally. A lost
//! race is retried from a fresh read, up to the configured ceiling, with
//! jittered backoff in between. No lock is held at any point.

use crate::error::AppError;
use crate::models::Activity;
use crate::store::{StoreError, VersionedStore};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Retry ceiling and backoff bounds for conditional writes.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_min_ms: 100,
            backoff_max_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Uniformly jittered pause before the next attempt.
    fn backoff(&self) -> Duration {
        let ms = if self.backoff_max_ms > self.backoff_min_ms {
            rand::thread_rng().gen_range(self.backoff_min_ms..=self.backoff_max_ms)
        } else {
            self.backoff_min_ms
        };
        Duration::from_millis(ms)
    }
}

/// Typed CRUD over activity documents.
#[derive(Clone)]
pub struct ActivityRepository {
    store: Arc<dyn VersionedStore>,
    policy: RetryPolicy,
}

impl ActivityRepository {
    pub fn new(store: Arc<dyn VersionedStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Fetch one activity.
    pub async fn get(&self, id: &str) -> Result<Activity, AppError> {
        let entry = self
            .store
            .get(id)
            .await
            .map_err(|e| Self::store_error(id, e))?;
        Self::decode(id, &entry.body)
    }

    /// Create a new activity document.
    ///
    /// The repository owns the clock: `createdAt` and `updatedAt` are
    /// stamped here, never by callers.
    pub async fn create(&self, mut activity: Activity) -> Result<Activity, AppError> {
        let now = Utc::now();
        activity.properties.created_at = now;
        activity.properties.updated_at = now;

        let body = activity.to_json()?;
        self.store
            .create(&activity.id, &body)
            .await
            .map_err(|e| Self::store_error(&activity.id, e))?;

        Ok(activity)
    }

    /// Read-modify-write with optimistic concurrency.
    ///
    /// `mutate` must be pure: it sees the freshly read activity and
    /// returns the full replacement, so it is safe to run once per
    /// attempt. Domain errors it returns abort immediately; only store
    /// version conflicts retry. A failed attempt writes nothing.
    pub async fn apply<F>(&self, id: &str, mutate: F) -> Result<Activity, AppError>
    where
        F: Fn(&Activity) -> Result<Activity, AppError> + Send,
    {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let entry = self
                .store
                .get(id)
                .await
                .map_err(|e| Self::store_error(id, e))?;
            let current = Self::decode(id, &entry.body)?;

            let mut updated = mutate(&current)?;
            updated.properties.updated_at = Utc::now();

            let body = updated.to_json()?;
            match self.store.conditional_update(id, &body, &entry.version).await {
                Ok(_) => return Ok(updated),
                Err(StoreError::VersionConflict(_)) if attempts < self.policy.max_attempts => {
                    let delay = self.policy.backoff();
                    tracing::debug!(
                        id = %id,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Conditional write lost a race, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(StoreError::VersionConflict(_)) => {
                    tracing::warn!(id = %id, attempts, "Conditional write retries exhausted");
                    return Err(AppError::UpdateFailed { attempts });
                }
                Err(e) => return Err(Self::store_error(id, e)),
            }
        }
    }

    /// List every activity, newest first.
    ///
    /// Documents that no longer decode are skipped rather than failing
    /// the whole listing.
    pub async fn list(&self) -> Result<Vec<Activity>, AppError> {
        let entries = match self.store.list().await {
            Ok(entries) => entries,
            Err(StoreError::Unavailable(msg)) => return Err(AppError::StoreUnavailable(msg)),
            Err(e) => return Err(AppError::Internal(anyhow::Error::new(e))),
        };

        let mut activities = Vec::with_capacity(entries.len());
        for entry in entries {
            match Activity::from_json(&entry.body) {
                Ok(activity) => activities.push(activity),
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "Skipping malformed activity document");
                }
            }
        }

        activities.sort_by(|a, b| b.properties.created_at.cmp(&a.properties.created_at));
        Ok(activities)
    }

    fn decode(id: &str, body: &str) -> Result<Activity, AppError> {
        Activity::from_json(body).map_err(|e| {
            tracing::error!(id = %id, error = %e, "Stored activity document is malformed");
            AppError::Internal(anyhow::Error::new(e))
        })
    }

    fn store_error(id: &str, err: StoreError) -> AppError {
        match err {
            StoreError::NotFound(_) => AppError::NotFound(format!("Activity {} not found", id)),
            StoreError::AlreadyExists(_) => {
                AppError::AlreadyExists(format!("Activity {} already exists", id))
            }
            StoreError::VersionConflict(_) => AppError::UpdateFailed { attempts: 1 },
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}
