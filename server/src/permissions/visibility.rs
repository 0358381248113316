//! Event visibility.
//!
//! Two independent gates decide what a viewer sees of an event:
//! - listing: approved events are listed for everyone, other statuses only
//!   for the creator and admins
//! - detail: VIP-gated events show full details only to VIP subscribers,
//!   admins and the creator; everyone else gets a locked placeholder

use chrono::{DateTime, Utc};
use parti_common::{Role, SubscriptionTier};
use serde::Serialize;
use uuid::Uuid;

use super::access::Principal;
use crate::db::Event;

/// Whoever is looking at an event. Anonymous viewers have no id and no
/// role, and count as basic tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub id: Option<Uuid>,
    pub role: Option<Role>,
    pub tier: SubscriptionTier,
}

impl Viewer {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            id: None,
            role: None,
            tier: SubscriptionTier::Basic,
        }
    }

    fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_admin())
    }

    fn created(&self, event: &Event) -> bool {
        self.id == Some(event.created_by)
    }
}

impl From<Principal> for Viewer {
    fn from(principal: Principal) -> Self {
        Self {
            id: Some(principal.id),
            role: Some(principal.role),
            tier: principal.tier,
        }
    }
}

/// What a viewer gets when asking for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAccess {
    Full,
    Locked,
    /// Reported as not found.
    Hidden,
}

/// Stand-in for a VIP event the viewer may not open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedEvent {
    pub id: Uuid,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub min_tier_required: SubscriptionTier,
    pub category_id: Option<Uuid>,
    /// Always `true`.
    pub locked: bool,
}

impl From<&Event> for LockedEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            date_time: event.date_time,
            min_tier_required: event.min_tier_required,
            category_id: event.category_id,
            locked: true,
        }
    }
}

/// An event as exposed to a specific viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventView {
    Full(Event),
    Locked(LockedEvent),
}

impl EventView {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

/// Tier and status gates for events.
pub struct VisibilityPolicy;

impl VisibilityPolicy {
    /// Whether the viewer may see the event's full details.
    #[must_use]
    pub fn can_view(viewer: &Viewer, event: &Event) -> bool {
        event.min_tier_required == SubscriptionTier::Basic
            || viewer.tier == SubscriptionTier::Vip
            || viewer.is_admin()
            || viewer.created(event)
    }

    /// Whether the event appears to the viewer at all.
    #[must_use]
    pub fn is_listed(viewer: &Viewer, event: &Event) -> bool {
        event.status.is_approved() || viewer.is_admin() || viewer.created(event)
    }

    #[must_use]
    pub fn detail_access(viewer: &Viewer, event: &Event) -> DetailAccess {
        if !Self::is_listed(viewer, event) {
            DetailAccess::Hidden
        } else if Self::can_view(viewer, event) {
            DetailAccess::Full
        } else {
            DetailAccess::Locked
        }
    }

    /// Full event or placeholder. Assumes the event is listed for the viewer.
    #[must_use]
    pub fn mask(viewer: &Viewer, event: Event) -> EventView {
        if Self::can_view(viewer, &event) {
            EventView::Full(event)
        } else {
            EventView::Locked(LockedEvent::from(&event))
        }
    }
}
