// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use site_tracker::config::Config;
use site_tracker::middleware::auth::create_jwt;
use site_tracker::models::{Actor, Geofence, GeoPoint};
use site_tracker::repository::{ActivityRepository, RetryPolicy};
use site_tracker::routes::create_router;
use site_tracker::services::{GeofenceValidator, LifecycleEngine, NewActivity};
use site_tracker::store::InMemoryDocumentStore;
use site_tracker::AppState;
use std::sync::Arc;

/// Fast retry policy so contention tests do not sleep for real.
#[allow(dead_code)]
pub fn test_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        backoff_min_ms: 1,
        backoff_max_ms: 3,
    }
}

/// Engine over a fresh in-memory store.
#[allow(dead_code)]
pub fn test_engine() -> LifecycleEngine {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = ActivityRepository::new(store, test_policy());
    LifecycleEngine::new(repository, GeofenceValidator::new(0.0))
}

/// Create a test app over an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = ActivityRepository::new(store, config.retry_policy());
    let engine = LifecycleEngine::new(
        repository,
        GeofenceValidator::new(config.geofence_tolerance_meters),
    );

    let state = Arc::new(AppState { config, engine });
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn admin() -> Actor {
    Actor::Admin {
        id: "ops".to_string(),
    }
}

#[allow(dead_code)]
pub fn vendor(id: &str) -> Actor {
    Actor::Vendor { id: id.to_string() }
}

/// Fence used by the scenario tests: 50 m around (40.700, -73.900).
#[allow(dead_code)]
pub fn site_fence() -> Geofence {
    Geofence {
        center: GeoPoint::new(40.700, -73.900),
        radius_meters: 50.0,
    }
}

#[allow(dead_code)]
pub fn fenced_activity(assigned_vendor: &str) -> NewActivity {
    NewActivity {
        title: "Repair EV charger".to_string(),
        description: "Unit 4 reports a ground fault".to_string(),
        assigned_vendor: assigned_vendor.to_string(),
        site: "Zerega".to_string(),
        category: "Repair".to_string(),
        geofence: Some(site_fence()),
    }
}

/// Create a test JWT for an actor session.
#[allow(dead_code)]
pub fn create_test_jwt(sub: &str, role: &str, signing_key: &[u8]) -> String {
    create_jwt(sub, role, signing_key).expect("JWT creation should succeed")
}
