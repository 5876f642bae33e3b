//! Vesting schedule engine
//!
//! This crate turns grants into dated vesting events:
//! - Schedule resolution across grant, call, plan template, plan fallback and defaults
//! - Period planning and integer share allocation that always reconciles
//! - Event materialization shared by preview and persistence
//! - Milestone reconciliation with explicit, transactional regeneration
//! - Display status projection against an explicit observation date

mod allocator;
mod engine;
mod materializer;
mod outcome;
mod planner;
mod reconcile;
mod resolver;
mod status;
mod summary;

pub use allocator::*;
pub use engine::*;
pub use materializer::*;
pub use outcome::*;
pub use planner::*;
pub use reconcile::*;
pub use resolver::*;
pub use status::*;
pub use summary::*;
