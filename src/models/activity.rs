// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity document model.
//!
//! Each activity is stored as one GeoJSON Feature on the document host.
//! The typed fields below are the ones this crate actively manages;
//! everything else in the envelope (foreign members, unknown property
//! keys, bounding boxes) is carried through decode and encode untouched
//! so other writers' data survives our updates.

use chrono::{DateTime, Utc};
use geojson::{feature::Id, Feature, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Work lifecycle status of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityStatus {
    Scheduled,
    InProgress,
    Paused,
    Completed,
}

impl ActivityStatus {
    /// Wire-format name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Scheduled => "scheduled",
            ActivityStatus::InProgress => "inProgress",
            ActivityStatus::Paused => "paused",
            ActivityStatus::Completed => "completed",
        }
    }

    /// Whether the status admits no outgoing transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivityStatus::Completed)
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON point geometry at this location (coordinates are lon, lat).
    pub fn to_geometry(self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Point(vec![self.lon, self.lat]))
    }
}

/// Circular fence around a work site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_meters: f64,
}

/// One timestamped location sample in an activity's trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Breadcrumb {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    /// Action that produced this sample ("start", "pause", "breadcrumb", ...)
    pub triggering_action: String,
}

/// A note left on an activity by an admin or the assigned vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Comment {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub text: String,
}

/// Typed view of the Feature `properties` object.
///
/// Unknown keys land in `extra` and are written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProperties {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Vendor authorized to act on this activity; empty before assignment.
    #[serde(default)]
    pub assigned_vendor: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub category: String,
    pub status: ActivityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence: Option<Geofence>,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A field activity and its document envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub properties: ActivityProperties,
    /// Last known point location, kept in step with the breadcrumb trail.
    pub geometry: Option<geojson::Geometry>,
    pub bbox: Option<geojson::Bbox>,
    pub foreign_members: Option<JsonObject>,
}

impl Activity {
    /// Decode an activity from its stored Feature document.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let feature: Feature = serde_json::from_str(raw)?;

        let id = match feature.id {
            Some(Id::String(s)) => s,
            Some(Id::Number(n)) => n.to_string(),
            None => return Err(DocumentError::MissingId),
        };

        let props = feature.properties.ok_or(DocumentError::MissingProperties)?;
        let properties: ActivityProperties = serde_json::from_value(JsonValue::Object(props))?;

        Ok(Self {
            id,
            properties,
            geometry: feature.geometry,
            bbox: feature.bbox,
            foreign_members: feature.foreign_members,
        })
    }

    /// Encode the activity back into its Feature document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.to_feature()?)?)
    }

    /// The activity as a JSON value (for API responses).
    pub fn to_value(&self) -> Result<JsonValue, DocumentError> {
        Ok(serde_json::to_value(self.to_feature()?)?)
    }

    fn to_feature(&self) -> Result<Feature, DocumentError> {
        let properties: JsonObject =
            serde_json::to_value(&self.properties).and_then(serde_json::from_value)?;

        Ok(Feature {
            bbox: self.bbox.clone(),
            geometry: self.geometry.clone(),
            id: Some(Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: self.foreign_members.clone(),
        })
    }

    /// Append a trail sample and move the feature geometry to it.
    ///
    /// The trail clock never runs backwards: a sample timestamped earlier
    /// than the current tail reuses the tail's timestamp.
    pub fn append_breadcrumb(&mut self, action: &str, location: GeoPoint, now: DateTime<Utc>) {
        let timestamp = match self.properties.breadcrumbs.last() {
            Some(tail) if tail.timestamp > now => tail.timestamp,
            _ => now,
        };

        self.properties.breadcrumbs.push(Breadcrumb {
            timestamp,
            lat: location.lat,
            lon: location.lon,
            triggering_action: action.to_string(),
        });
        self.geometry = Some(location.to_geometry());
    }
}

/// Errors from document (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Malformed activity document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Activity document has no usable id")]
    MissingId,

    #[error("Activity document has no properties")]
    MissingProperties,
}
