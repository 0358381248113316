//! Guarded actions and the rule table that gates them.

use std::collections::HashMap;

use parti_common::Role;

/// An operation that must pass [`AccessControl`](super::AccessControl)
/// before it touches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Change another profile's role
    SetUserRole,
    /// Change another profile's subscription tier
    SetUserTier,
    /// Submit a new event
    CreateEvent,
    /// Edit an existing event
    EditEvent,
    /// Move a pending event to approved
    ApproveEvent,
    /// Move a pending event to rejected
    RejectEvent,
    /// Permanently delete an event
    DeleteEvent,
    /// Create or edit a venue
    CreateOrEditVenue,
    /// Permanently delete a venue
    DeleteVenue,
    /// List every profile (admin console)
    ListProfiles,
    /// List events awaiting moderation
    ViewModerationQueue,
    /// List the caller's own submissions (agent dashboard)
    ViewOwnSubmissions,
}

impl Action {
    /// Returns the action name used in logs.
    ///
    /// # Examples
    ///
    /// ```
    /// use parti_server::permissions::Action;
    ///
    /// assert_eq!(Action::ApproveEvent.action_name(), "approve_event");
    /// ```
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::SetUserRole => "set_user_role",
            Self::SetUserTier => "set_user_tier",
            Self::CreateEvent => "create_event",
            Self::EditEvent => "edit_event",
            Self::ApproveEvent => "approve_event",
            Self::RejectEvent => "reject_event",
            Self::DeleteEvent => "delete_event",
            Self::CreateOrEditVenue => "create_or_edit_venue",
            Self::DeleteVenue => "delete_venue",
            Self::ListProfiles => "list_profiles",
            Self::ViewModerationQueue => "view_moderation_queue",
            Self::ViewOwnSubmissions => "view_own_submissions",
        }
    }

    /// Returns all actions as a slice.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SetUserRole,
            Self::SetUserTier,
            Self::CreateEvent,
            Self::EditEvent,
            Self::ApproveEvent,
            Self::RejectEvent,
            Self::DeleteEvent,
            Self::CreateOrEditVenue,
            Self::DeleteVenue,
            Self::ListProfiles,
            Self::ViewModerationQueue,
            Self::ViewOwnSubmissions,
        ]
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Condition under which an action is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Caller is an admin.
    AdminOnly,
    /// Caller may submit content (agent or admin).
    Submitter,
    /// Caller is an admin or owns the target.
    AdminOrOwner,
}

impl Rule {
    /// Whether the rule needs the target's owner to decide.
    #[must_use]
    pub const fn needs_owner(self) -> bool {
        matches!(self, Self::AdminOrOwner)
    }

    /// Apply the rule to a caller.
    ///
    /// `owned` says whether the caller owns the target; it only matters for
    /// [`Rule::AdminOrOwner`].
    #[must_use]
    pub const fn permits(self, role: Role, owned: bool) -> bool {
        match self {
            Self::AdminOnly => role.is_admin(),
            Self::Submitter => matches!(role, Role::Agent | Role::Admin),
            Self::AdminOrOwner => role.is_admin() || owned,
        }
    }
}

/// Action -> rule lookup.
///
/// Actions without a rule are denied.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<Action, Rule>,
}

impl RuleTable {
    #[must_use]
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// The rule set enforced by the service.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .rule(Action::SetUserRole, Rule::AdminOnly)
            .rule(Action::SetUserTier, Rule::AdminOnly)
            .rule(Action::ApproveEvent, Rule::AdminOnly)
            .rule(Action::RejectEvent, Rule::AdminOnly)
            .rule(Action::DeleteEvent, Rule::AdminOnly)
            .rule(Action::CreateOrEditVenue, Rule::AdminOnly)
            .rule(Action::DeleteVenue, Rule::AdminOnly)
            .rule(Action::ListProfiles, Rule::AdminOnly)
            .rule(Action::ViewModerationQueue, Rule::AdminOnly)
            .rule(Action::CreateEvent, Rule::Submitter)
            .rule(Action::ViewOwnSubmissions, Rule::Submitter)
            .rule(Action::EditEvent, Rule::AdminOrOwner)
            .build()
    }

    #[must_use]
    pub fn rule_for(&self, action: Action) -> Option<Rule> {
        self.rules.get(&action).copied()
    }

    /// Actions that have no rule.
    #[must_use]
    pub fn missing(&self) -> Vec<Action> {
        Action::all()
            .iter()
            .copied()
            .filter(|a| !self.rules.contains_key(a))
            .collect()
    }
}

/// Builder for [`RuleTable`]. A later rule for the same action replaces the
/// earlier one.
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: HashMap<Action, Rule>,
}

impl RuleTableBuilder {
    #[must_use]
    pub fn rule(mut self, action: Action, rule: Rule) -> Self {
        self.rules.insert(action, rule);
        self
    }

    #[must_use]
    pub fn build(self) -> RuleTable {
        RuleTable { rules: self.rules }
    }
}
