//! parti.life Server
//!
//! Nightlife event listings with agent submissions and admin moderation.
//! Every guarded mutation goes through [`permissions::AccessControl`];
//! every event read is masked by [`permissions::VisibilityPolicy`].

pub mod admin;
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod events;
pub mod permissions;
pub mod store;
pub mod venues;
