// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Site-Tracker: field activity tracking for vendor work crews.
//!
//! This crate provides the backend API for scheduling site activities,
//! gating lifecycle transitions on verified on-site presence, and
//! recording breadcrumb trails, with every activity stored as a
//! versioned document on a remote file host and all concurrent updates
//! resolved by optimistic conditional writes.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use services::LifecycleEngine;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub engine: LifecycleEngine,
}
