// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity lifecycle orchestration.
//!
//! Status changes follow a fixed transition table. Location-gated edges
//! verify the reported position against the activity's fence, and every
//! check runs inside the repository's retry loop against the freshest
//! revision of the document, so a caller that loses a write race is
//! re-validated from scratch against the winner's state.

use crate::error::AppError;
use crate::models::{
    Activity, ActivityAction, ActivityProperties, ActivityStatus, Actor, Comment, Geofence,
    GeoPoint,
};
use crate::repository::ActivityRepository;
use crate::services::access;
use crate::services::geofence::{self, GeofenceValidator};
use chrono::Utc;
use geojson::JsonObject;
use uuid::Uuid;

/// One legal edge in the status graph.
struct TransitionRule {
    from: ActivityStatus,
    action: ActivityAction,
    to: ActivityStatus,
    /// Whether the edge requires the actor inside the fence.
    gated: bool,
}

/// The complete status graph. Any (status, action) pair absent here is an
/// invalid transition.
const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: ActivityStatus::Scheduled,
        action: ActivityAction::Start,
        to: ActivityStatus::InProgress,
        gated: true,
    },
    TransitionRule {
        from: ActivityStatus::InProgress,
        action: ActivityAction::Pause,
        to: ActivityStatus::Paused,
        gated: false,
    },
    TransitionRule {
        from: ActivityStatus::Paused,
        action: ActivityAction::Resume,
        to: ActivityStatus::InProgress,
        gated: true,
    },
    TransitionRule {
        from: ActivityStatus::InProgress,
        action: ActivityAction::Complete,
        to: ActivityStatus::Completed,
        gated: true,
    },
];

fn rule_for(from: ActivityStatus, action: ActivityAction) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.action == action)
}

fn invalid_transition(status: ActivityStatus, action: ActivityAction) -> AppError {
    AppError::InvalidTransition {
        status: status.as_str().to_string(),
        action: action.as_str().to_string(),
    }
}

/// Input for creating an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub assigned_vendor: String,
    pub site: String,
    pub category: String,
    pub geofence: Option<Geofence>,
}

/// The state machine over activities.
pub struct LifecycleEngine {
    repository: ActivityRepository,
    validator: GeofenceValidator,
}

impl LifecycleEngine {
    pub fn new(repository: ActivityRepository, validator: GeofenceValidator) -> Self {
        Self {
            repository,
            validator,
        }
    }

    /// Create a new activity in `Scheduled`. Admin only.
    pub async fn create_activity(
        &self,
        actor: &Actor,
        new: NewActivity,
    ) -> Result<Activity, AppError> {
        if !access::can_create(actor) {
            return Err(AppError::Unauthorized);
        }
        if let Some(fence) = &new.geofence {
            geofence::validate_fence(fence)?;
        }

        let now = Utc::now();
        let geometry = new.geofence.map(|fence| fence.center.to_geometry());
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            properties: ActivityProperties {
                title: new.title,
                description: new.description,
                assigned_vendor: new.assigned_vendor,
                site: new.site,
                category: new.category,
                status: ActivityStatus::Scheduled,
                geofence: new.geofence,
                breadcrumbs: Vec::new(),
                comments: Vec::new(),
                created_at: now,
                updated_at: now,
                extra: JsonObject::new(),
            },
            geometry,
            bbox: None,
            foreign_members: None,
        };

        let created = self.repository.create(activity).await?;
        tracing::info!(
            id = %created.id,
            vendor = %created.properties.assigned_vendor,
            "Activity created"
        );
        Ok(created)
    }

    /// Fetch one activity, if `actor` may see it.
    pub async fn get_activity(&self, actor: &Actor, id: &str) -> Result<Activity, AppError> {
        let activity = self.repository.get(id).await?;
        if !access::authorize(actor, &activity, ActivityAction::View) {
            return Err(AppError::Unauthorized);
        }
        Ok(activity)
    }

    /// List activities visible to `actor`, newest first, optionally
    /// narrowed to one vendor's assignments.
    pub async fn list_activities(
        &self,
        actor: &Actor,
        vendor: Option<&str>,
    ) -> Result<Vec<Activity>, AppError> {
        let all = self.repository.list().await?;
        let mut visible = access::filter_visible(actor, all);
        if let Some(vendor) = vendor {
            visible.retain(|a| a.properties.assigned_vendor == vendor);
        }
        Ok(visible)
    }

    /// Vendor arrives on site and begins work.
    pub async fn start_work(
        &self,
        actor: &Actor,
        id: &str,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        self.transition(actor, id, ActivityAction::Start, location)
            .await
    }

    /// Suspend work without leaving the lifecycle. Never location-gated:
    /// stepping out of the fence is a legitimate reason to pause.
    pub async fn pause_work(
        &self,
        actor: &Actor,
        id: &str,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        self.transition(actor, id, ActivityAction::Pause, location)
            .await
    }

    /// Return to work after a pause.
    pub async fn resume_work(
        &self,
        actor: &Actor,
        id: &str,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        self.transition(actor, id, ActivityAction::Resume, location)
            .await
    }

    /// Close out the activity. Terminal.
    pub async fn complete_work(
        &self,
        actor: &Actor,
        id: &str,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        self.transition(actor, id, ActivityAction::Complete, location)
            .await
    }

    async fn transition(
        &self,
        actor: &Actor,
        id: &str,
        action: ActivityAction,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        let actor = actor.clone();
        let validator = self.validator;

        let updated = self
            .repository
            .apply(id, move |current| {
                if !access::authorize(&actor, current, action) {
                    return Err(AppError::Unauthorized);
                }

                let status = current.properties.status;
                let rule = rule_for(status, action)
                    .ok_or_else(|| invalid_transition(status, action))?;

                // Admins close out or drive work remotely; the fence
                // models the vendor's on-site presence.
                if rule.gated && !actor.is_admin() {
                    validator.check(current, location)?;
                } else {
                    geofence::validate_point(location)?;
                }

                let mut updated = current.clone();
                updated.properties.status = rule.to;
                updated.append_breadcrumb(action.as_str(), location, Utc::now());
                Ok(updated)
            })
            .await?;

        tracing::info!(
            id = %id,
            action = action.as_str(),
            status = updated.properties.status.as_str(),
            "Activity transition applied"
        );
        Ok(updated)
    }

    /// Append a trail sample while work is open (`InProgress` or
    /// `Paused`). No fence check: drifting outside is an observable fact
    /// worth recording, not an error.
    pub async fn record_breadcrumb(
        &self,
        actor: &Actor,
        id: &str,
        location: GeoPoint,
    ) -> Result<Activity, AppError> {
        let actor = actor.clone();

        self.repository
            .apply(id, move |current| {
                if !access::authorize(&actor, current, ActivityAction::RecordBreadcrumb) {
                    return Err(AppError::Unauthorized);
                }

                let status = current.properties.status;
                if !matches!(
                    status,
                    ActivityStatus::InProgress | ActivityStatus::Paused
                ) {
                    return Err(invalid_transition(status, ActivityAction::RecordBreadcrumb));
                }

                geofence::validate_point(location)?;

                let mut updated = current.clone();
                updated.append_breadcrumb(
                    ActivityAction::RecordBreadcrumb.as_str(),
                    location,
                    Utc::now(),
                );
                Ok(updated)
            })
            .await
    }

    /// Append a comment. Allowed in any status.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        id: &str,
        text: String,
    ) -> Result<Activity, AppError> {
        let actor = actor.clone();

        self.repository
            .apply(id, move |current| {
                if !access::authorize(&actor, current, ActivityAction::Comment) {
                    return Err(AppError::Unauthorized);
                }

                let mut updated = current.clone();
                updated.properties.comments.push(Comment {
                    timestamp: Utc::now(),
                    author: actor.id().to_string(),
                    text: text.clone(),
                });
                Ok(updated)
            })
            .await
    }

    /// Move a scheduled activity to a different vendor. Admin only, and
    /// only before work starts.
    pub async fn reassign(
        &self,
        actor: &Actor,
        id: &str,
        vendor: String,
    ) -> Result<Activity, AppError> {
        let actor = actor.clone();

        let updated = self
            .repository
            .apply(id, move |current| {
                if !access::authorize(&actor, current, ActivityAction::Reassign) {
                    return Err(AppError::Unauthorized);
                }

                let status = current.properties.status;
                if status != ActivityStatus::Scheduled {
                    return Err(invalid_transition(status, ActivityAction::Reassign));
                }

                let mut updated = current.clone();
                updated.properties.assigned_vendor = vendor.clone();
                Ok(updated)
            })
            .await?;

        tracing::info!(
            id = %id,
            vendor = %updated.properties.assigned_vendor,
            "Activity reassigned"
        );
        Ok(updated)
    }
}
