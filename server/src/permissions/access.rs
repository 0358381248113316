//! Access control over guarded actions.
//!
//! [`AccessControl::evaluate`] is a pure decision over a resolved caller and
//! target owner. [`AccessControl::authorize`] resolves both from the store
//! first; it only ever reads.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parti_common::{Role, SubscriptionTier};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::action::{Action, RuleTable};
use crate::auth::ErrorResponse;
use crate::db::Profile;
use crate::store::{Store, StoreError};

/// A caller whose profile has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub tier: SubscriptionTier,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&Profile> for Principal {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            tier: profile.subscription_tier,
        }
    }
}

/// Entity an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    Event(Uuid),
    Profile(Uuid),
    Venue(Uuid),
}

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No caller identity.
    Unauthenticated,
    /// The caller id has no stored profile.
    ProfileNotFound,
    /// The caller's role does not satisfy the action's rule.
    Unauthorized,
    /// The rule needed the target's owner but the target is gone.
    TargetNotFound,
}

impl DenyReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::ProfileNotFound => "profile_not_found",
            Self::Unauthorized => "unauthorized",
            Self::TargetNotFound => "target_not_found",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Principal),
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Access error surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DenyReason> for AccessError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            DenyReason::ProfileNotFound | DenyReason::Unauthorized => Self::Unauthorized,
            DenyReason::TargetNotFound => Self::NotFound,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            Self::Unauthorized => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
            Self::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Role-based gate for every mutation and privileged read.
#[derive(Debug, Clone)]
pub struct AccessControl {
    rules: RuleTable,
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new(RuleTable::standard())
    }
}

impl AccessControl {
    #[must_use]
    pub const fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// Decide `action` for a resolved caller.
    ///
    /// `owner` is the target's `created_by`, when the target has one.
    #[must_use]
    pub fn evaluate(&self, caller: Principal, action: Action, owner: Option<Uuid>) -> Decision {
        let Some(rule) = self.rules.rule_for(action) else {
            return Decision::Deny(DenyReason::Unauthorized);
        };

        if rule.permits(caller.role, owner == Some(caller.id)) {
            Decision::Allow(caller)
        } else {
            Decision::Deny(DenyReason::Unauthorized)
        }
    }

    /// Resolve the caller (and the target owner when the rule needs it),
    /// then evaluate.
    ///
    /// Reads current state on every call. Store failures are returned as
    /// `Err`, never turned into a denial.
    #[tracing::instrument(skip(self, store, action), fields(action = action.action_name()))]
    pub async fn authorize(
        &self,
        store: &dyn Store,
        caller: Option<Uuid>,
        action: Action,
        target: Target,
    ) -> Result<Decision, StoreError> {
        let decision = self.resolve(store, caller, action, target).await?;
        if let Decision::Deny(reason) = decision {
            warn!(
                user_id = ?caller,
                action = action.action_name(),
                reason = reason.as_str(),
                "Action denied"
            );
        }
        Ok(decision)
    }

    /// [`authorize`](Self::authorize), with a denial turned into an error.
    pub async fn require(
        &self,
        store: &dyn Store,
        caller: Option<Uuid>,
        action: Action,
        target: Target,
    ) -> Result<Principal, AccessError> {
        match self.authorize(store, caller, action, target).await? {
            Decision::Allow(principal) => Ok(principal),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }

    async fn resolve(
        &self,
        store: &dyn Store,
        caller: Option<Uuid>,
        action: Action,
        target: Target,
    ) -> Result<Decision, StoreError> {
        let Some(caller_id) = caller else {
            return Ok(Decision::Deny(DenyReason::Unauthenticated));
        };
        let Some(profile) = store.get_profile(caller_id).await? else {
            return Ok(Decision::Deny(DenyReason::ProfileNotFound));
        };
        let principal = Principal::from(&profile);

        let needs_owner = self.rules.rule_for(action).is_some_and(|r| r.needs_owner());
        let owner = match target {
            Target::Event(event_id) if needs_owner => match store.get_event(event_id).await? {
                Some(event) => Some(event.created_by),
                None => return Ok(Decision::Deny(DenyReason::TargetNotFound)),
            },
            _ => None,
        };

        Ok(self.evaluate(principal, action, owner))
    }
}
