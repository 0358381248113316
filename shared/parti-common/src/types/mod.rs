//! Shared types.

pub mod event;
pub mod profile;

pub use event::*;
pub use profile::*;
