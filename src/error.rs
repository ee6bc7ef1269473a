// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not allowed")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot {action} an activity in status {status}")]
    InvalidTransition { status: String, action: String },

    #[error("Location is {distance_meters:.1} m from the site center (fence radius {radius_meters:.1} m)")]
    OutsideGeofence {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Update abandoned after {attempts} conflicting attempts")]
    UpdateFailed { attempts: u32 },

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::AlreadyExists(msg) => {
                (StatusCode::CONFLICT, "already_exists", Some(msg.clone()))
            }
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "invalid_transition", Some(self.to_string()))
            }
            AppError::OutsideGeofence { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "outside_geofence",
                Some(self.to_string()),
            ),
            AppError::InvalidCoordinate(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_coordinate", Some(msg.clone()))
            }
            AppError::UpdateFailed { attempts } => {
                tracing::warn!(attempts, "Conditional update exhausted retries");
                (StatusCode::CONFLICT, "update_conflict", Some(self.to_string()))
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Document store unavailable");
                (StatusCode::BAD_GATEWAY, "store_unavailable", None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::models::DocumentError> for AppError {
    fn from(err: crate::models::DocumentError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
