// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated actors.

use crate::error::{AppError, Result};
use crate::models::{Activity, Actor, Geofence, GeoPoint};
use crate::services::lifecycle::NewActivity;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", post(create_activity).get(list_activities))
        .route("/api/activities/{id}", get(get_activity))
        .route("/api/activities/{id}/start", post(start_work))
        .route("/api/activities/{id}/pause", post(pause_work))
        .route("/api/activities/{id}/resume", post(resume_work))
        .route("/api/activities/{id}/complete", post(complete_work))
        .route("/api/activities/{id}/breadcrumbs", post(record_breadcrumb))
        .route("/api/activities/{id}/comments", post(add_comment))
        .route("/api/activities/{id}/reassign", post(reassign))
}

// ─── Payloads ────────────────────────────────────────────────

/// Body for creating an activity (admin only).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    /// May be empty: activities can be created before assignment.
    #[serde(default)]
    pub assigned_vendor: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub category: String,
    pub geofence: Option<Geofence>,
}

/// Reported device location for lifecycle actions.
///
/// Range checking happens in the engine so that bad coordinates surface
/// as `invalid_coordinate`, not a generic validation failure.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lon: f64,
}

impl LocationRequest {
    fn point(self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Body for commenting on an activity.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// Body for reassigning an activity to another vendor (admin only).
#[derive(Debug, Deserialize, Validate)]
pub struct ReassignRequest {
    #[validate(length(min = 1))]
    pub vendor: String,
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Filter by assigned vendor
    vendor: Option<String>,
}

/// Listing response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    /// One GeoJSON Feature per activity, newest first.
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown[]"))]
    pub activities: Vec<serde_json::Value>,
    pub total: u32,
}

// ─── Activities ──────────────────────────────────────────────

/// Create a new activity.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created = state
        .engine
        .create_activity(
            &actor,
            NewActivity {
                title: payload.title,
                description: payload.description,
                assigned_vendor: payload.assigned_vendor,
                site: payload.site,
                category: payload.category,
                geofence: payload.geofence,
            },
        )
        .await?;

    Ok(Json(created.to_value()?))
}

/// List visible activities, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    tracing::debug!(
        actor = actor.id(),
        vendor = ?params.vendor,
        "Listing activities"
    );

    let activities = state
        .engine
        .list_activities(&actor, params.vendor.as_deref())
        .await?;

    let features = activities
        .iter()
        .map(Activity::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total = features.len() as u32;
    Ok(Json(ActivitiesResponse {
        activities: features,
        total,
    }))
}

/// Fetch a single activity.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let activity = state.engine.get_activity(&actor, &id).await?;
    Ok(Json(activity.to_value()?))
}

// ─── Lifecycle ───────────────────────────────────────────────

/// Begin work on site.
async fn start_work(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<serde_json::Value>> {
    let activity = state.engine.start_work(&actor, &id, location.point()).await?;
    Ok(Json(activity.to_value()?))
}

/// Suspend work.
async fn pause_work(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<serde_json::Value>> {
    let activity = state.engine.pause_work(&actor, &id, location.point()).await?;
    Ok(Json(activity.to_value()?))
}

/// Return to work after a pause.
async fn resume_work(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<serde_json::Value>> {
    let activity = state.engine.resume_work(&actor, &id, location.point()).await?;
    Ok(Json(activity.to_value()?))
}

/// Close out the activity.
async fn complete_work(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<serde_json::Value>> {
    let activity = state
        .engine
        .complete_work(&actor, &id, location.point())
        .await?;
    Ok(Json(activity.to_value()?))
}

/// Append a trail sample while work is open.
async fn record_breadcrumb(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<serde_json::Value>> {
    let activity = state
        .engine
        .record_breadcrumb(&actor, &id, location.point())
        .await?;
    Ok(Json(activity.to_value()?))
}

// ─── Comments & assignment ───────────────────────────────────

/// Append a comment.
async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let activity = state.engine.add_comment(&actor, &id, payload.text).await?;
    Ok(Json(activity.to_value()?))
}

/// Reassign a scheduled activity to another vendor.
async fn reassign(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(payload): Json<ReassignRequest>,
) -> Result<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let activity = state.engine.reassign(&actor, &id, payload.vendor).await?;
    Ok(Json(activity.to_value()?))
}
