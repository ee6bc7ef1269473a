// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access;
pub mod geofence;
pub mod lifecycle;

pub use geofence::GeofenceValidator;
pub use lifecycle::{LifecycleEngine, NewActivity};
