// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role checks for activity operations.
//!
//! Every mutating path and every read path goes through this module
//! before touching or returning activity data.

use crate::models::{Activity, ActivityAction, Actor};

/// Whether `actor` may perform `action` on `activity`.
///
/// Admins pass every check. Vendors act only on their own assignment,
/// and never reassign.
pub fn authorize(actor: &Actor, activity: &Activity, action: ActivityAction) -> bool {
    match actor {
        Actor::Admin { .. } => true,
        Actor::Vendor { id } => {
            activity.properties.assigned_vendor == *id
                && !matches!(action, ActivityAction::Reassign)
        }
    }
}

/// Whether `actor` may create new activities.
pub fn can_create(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Narrow a listing to the activities `actor` may view.
pub fn filter_visible(actor: &Actor, activities: Vec<Activity>) -> Vec<Activity> {
    match actor {
        Actor::Admin { .. } => activities,
        Actor::Vendor { id } => activities
            .into_iter()
            .filter(|a| a.properties.assigned_vendor == *id)
            .collect(),
    }
}
