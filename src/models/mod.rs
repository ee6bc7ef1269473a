// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod actor;

pub use activity::{
    Activity, ActivityProperties, ActivityStatus, Breadcrumb, Comment, DocumentError, Geofence,
    GeoPoint,
};
pub use actor::{ActivityAction, Actor};
