//! Shared utilities for the vesting engine
//!
//! This crate provides:
//! - ID types (GrantId, PlanId, ScheduleId, RunId)
//! - Calendar utilities (month arithmetic, mockable "today")
//! - Error types
//! - Per-grant regeneration locks
//! - Default paths for the data directory and database

mod error;
mod ids;
mod locks;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use locks::*;
pub use paths::*;
pub use time::*;
