//! Event Types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Moderation state of a submitted event.
///
/// `pending` moves to `approved` or `rejected` only by an admin. Any edit by
/// a non-admin puts the event back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "event_status", rename_all = "lowercase"))]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::unknown("event status", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse::<EventStatus>().unwrap(), EventStatus::Pending);
        assert_eq!(
            "approved".parse::<EventStatus>().unwrap(),
            EventStatus::Approved
        );
        assert_eq!(
            "rejected".parse::<EventStatus>().unwrap(),
            EventStatus::Rejected
        );
        assert!("archived".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(EventStatus::default(), EventStatus::Pending);
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in [
            EventStatus::Pending,
            EventStatus::Approved,
            EventStatus::Rejected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
