// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance and fence containment checks.

use crate::error::AppError;
use crate::models::{Activity, Geofence, GeoPoint};
use geo::{Distance, Haversine, Point};

/// Meters between two WGS84 coordinates along the great circle.
///
/// Haversine is accurate to well under a meter at fence radii in the
/// 10 m to 10 km range, which is all this system cares about.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat))
}

/// Whether `point` lies inside `fence`, boundary inclusive.
pub fn is_within(point: GeoPoint, fence: &Geofence) -> bool {
    distance_meters(point, fence.center) <= fence.radius_meters
}

/// Reject coordinates that are not plottable on WGS84.
pub fn validate_point(point: GeoPoint) -> Result<(), AppError> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(AppError::InvalidCoordinate(format!(
            "non-finite coordinate ({}, {})",
            point.lat, point.lon
        )));
    }
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(AppError::InvalidCoordinate(format!(
            "latitude {} out of range",
            point.lat
        )));
    }
    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(AppError::InvalidCoordinate(format!(
            "longitude {} out of range",
            point.lon
        )));
    }
    Ok(())
}

/// Validate a fence definition at creation time.
pub fn validate_fence(fence: &Geofence) -> Result<(), AppError> {
    validate_point(fence.center)?;
    if !fence.radius_meters.is_finite() || fence.radius_meters <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "geofence radius must be positive, got {}",
            fence.radius_meters
        )));
    }
    Ok(())
}

/// Gate check for location-verified transitions.
#[derive(Debug, Clone, Copy)]
pub struct GeofenceValidator {
    tolerance_meters: f64,
}

impl GeofenceValidator {
    /// `tolerance_meters` widens every fence to absorb GPS drift.
    pub fn new(tolerance_meters: f64) -> Self {
        Self { tolerance_meters }
    }

    /// Check a reported location against an activity's fence.
    ///
    /// Activities without a fence pass unconditionally: an unfenced site
    /// does not gate its work.
    pub fn check(&self, activity: &Activity, point: GeoPoint) -> Result<(), AppError> {
        validate_point(point)?;

        let Some(fence) = &activity.properties.geofence else {
            return Ok(());
        };

        let distance = distance_meters(point, fence.center);
        if distance <= fence.radius_meters + self.tolerance_meters {
            Ok(())
        } else {
            Err(AppError::OutsideGeofence {
                distance_meters: distance,
                radius_meters: fence.radius_meters,
            })
        }
    }
}
