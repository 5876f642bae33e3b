//! Domain records for the vesting engine
//!
//! This crate defines the types every other crate agrees on:
//! - Schedule enums (frequency, distribution mode, schedule kind)
//! - Records (schedule definitions, milestones, plans, grants, events)
//! - Lifecycle and display statuses

mod records;
mod status;
mod types;

pub use records::*;
pub use status::*;
pub use types::*;
