//! parti.life Common Library
//!
//! Closed enumerations and wire summaries shared by the server and its clients.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
