//! Shared utilities for rollcall
//!
//! This crate provides:
//! - ID types (StudentId, ClassId, SessionId, RecordId)
//! - Time utilities (wall-clock access, date/time formatting)
//! - The domain error type
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
