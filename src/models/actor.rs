// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Actor identity and the operations actors attempt.

/// An authenticated caller, tagged by capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Back-office operator with full access.
    Admin { id: String },
    /// Field vendor, restricted to their own assignments.
    Vendor { id: String },
}

impl Actor {
    pub fn id(&self) -> &str {
        match self {
            Actor::Admin { id } | Actor::Vendor { id } => id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin { .. })
    }
}

/// Operations an actor can attempt on an existing activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    View,
    Start,
    Pause,
    Resume,
    Complete,
    RecordBreadcrumb,
    Comment,
    Reassign,
}

impl ActivityAction {
    /// Name used in errors, logs, and breadcrumb records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::View => "view",
            ActivityAction::Start => "start",
            ActivityAction::Pause => "pause",
            ActivityAction::Resume => "resume",
            ActivityAction::Complete => "complete",
            ActivityAction::RecordBreadcrumb => "breadcrumb",
            ActivityAction::Comment => "comment",
            ActivityAction::Reassign => "reassign",
        }
    }
}
