//! Persistence layer for the vesting engine
//!
//! Provides:
//! - Schedule, plan and grant records
//! - Milestone templates and vesting events, replaced atomically
//! - Audit log (append-only)

mod audit;
mod sqlite;
mod traits;

pub use audit::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;
use vesting_util::VestingError;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The write would violate a storage policy
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// A stored row could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for VestingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => VestingError::NotFound { kind, id },
            other => VestingError::persistence(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
