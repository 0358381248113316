//! Authorization and visibility.
//!
//! - [`AccessControl`]: role rules gating every mutation and privileged read
//! - [`VisibilityPolicy`]: status and tier gates on what a viewer sees

pub mod access;
pub mod action;
pub mod visibility;

pub use access::{AccessControl, AccessError, Decision, DenyReason, Principal, Target};
pub use action::{Action, Rule, RuleTable, RuleTableBuilder};
pub use visibility::{DetailAccess, EventView, LockedEvent, Viewer, VisibilityPolicy};
