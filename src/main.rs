// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Site-Tracker API Server
//!
//! Tracks field-service activities against a versioned remote document
//! store: geofenced lifecycle transitions, breadcrumb trails, and
//! conflict-safe concurrent updates from admins and vendors.

use site_tracker::{
    config::Config,
    repository::ActivityRepository,
    services::{GeofenceValidator, LifecycleEngine},
    store::HttpDocumentStore,
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Site-Tracker API");

    // Build the document store client
    let store = HttpDocumentStore::new(
        config.store_url.clone(),
        config.store_auth_token.clone(),
        Duration::from_secs(config.store_timeout_secs),
    )
    .expect("Failed to build document store client");
    tracing::info!(url = %config.store_url, "Document store client initialized");

    // Wire the repository and lifecycle engine
    let repository = ActivityRepository::new(Arc::new(store), config.retry_policy());
    let validator = GeofenceValidator::new(config.geofence_tolerance_meters);
    let engine = LifecycleEngine::new(repository, validator);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        engine,
    });

    // Build router
    let app = site_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
