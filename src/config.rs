// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::repository::RetryPolicy;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the versioned document host
    pub store_url: String,
    /// Bearer token for the document host, if it requires one
    pub store_auth_token: Option<String>,
    /// Per-round-trip timeout for store requests (seconds)
    pub store_timeout_secs: u64,
    /// Retry ceiling for conditional writes
    pub update_max_attempts: u32,
    /// Lower bound of the jittered retry backoff (milliseconds)
    pub update_backoff_min_ms: u64,
    /// Upper bound of the jittered retry backoff (milliseconds)
    pub update_backoff_max_ms: u64,
    /// Slack added to fence radii to absorb GPS drift (meters)
    pub geofence_tolerance_meters: f64,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            store_url: env::var("STORE_URL").map_err(|_| ConfigError::Missing("STORE_URL"))?,
            store_auth_token: env::var("STORE_AUTH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            update_max_attempts: env::var("UPDATE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            update_backoff_min_ms: env::var("UPDATE_BACKOFF_MIN_MS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            update_backoff_max_ms: env::var("UPDATE_BACKOFF_MAX_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            geofence_tolerance_meters: env::var("GEOFENCE_TOLERANCE_METERS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0.0),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Retry policy for conditional writes.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.update_max_attempts,
            backoff_min_ms: self.update_backoff_min_ms,
            backoff_max_ms: self.update_backoff_max_ms,
        }
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            store_url: "http://127.0.0.1:9/store".to_string(),
            store_auth_token: None,
            store_timeout_secs: 2,
            update_max_attempts: 5,
            update_backoff_min_ms: 1,
            update_backoff_max_ms: 5,
            geofence_tolerance_meters: 0.0,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
