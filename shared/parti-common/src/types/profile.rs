//! Profile Types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Platform role. Every profile holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role", rename_all = "lowercase"))]
pub enum Role {
    /// Browses and views events.
    #[default]
    User,
    /// Submits events for moderation.
    Agent,
    /// Moderates events and manages profiles and venues.
    Admin,
}

impl Role {
    /// Wire and storage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    /// All roles, lowest privilege first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Agent, Self::Admin]
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may choose itself at signup.
    ///
    /// Admin is only ever granted by another admin or by the operator tool.
    #[must_use]
    pub const fn is_self_assignable(&self) -> bool {
        matches!(self, Self::User | Self::Agent)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(Error::unknown("role", other)),
        }
    }
}

/// Subscription tier. Gates VIP-only event details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_tier", rename_all = "lowercase")
)]
pub enum SubscriptionTier {
    #[default]
    Basic,
    Vip,
}

impl SubscriptionTier {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Vip => "vip",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "vip" => Ok(Self::Vip),
            other => Err(Error::unknown("subscription tier", other)),
        }
    }
}

/// Profile as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile ID (same as the account ID).
    pub id: Uuid,
    pub role: Role,
    pub subscription_tier: SubscriptionTier,
    /// Display name, if the user gave one.
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role value: \"superuser\"");
        assert!("Admin".parse::<Role>().is_err(), "parsing is case sensitive");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }

    #[test]
    fn test_only_user_and_agent_are_self_assignable() {
        assert!(Role::User.is_self_assignable());
        assert!(Role::Agent.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(SubscriptionTier::default(), SubscriptionTier::Basic);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("vip".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Vip);
        assert_eq!(
            "basic".parse::<SubscriptionTier>().unwrap(),
            SubscriptionTier::Basic
        );
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }
}
