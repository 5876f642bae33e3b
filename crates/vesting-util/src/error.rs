//! Error types for the vesting engine

use std::fmt;
use thiserror::Error;

use crate::GrantId;

/// Pipeline stage a grant-level failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Plan,
    Allocate,
    Materialize,
    Reconcile,
    Persist,
    Project,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::Plan => "plan",
            Stage::Allocate => "allocate",
            Stage::Materialize => "materialize",
            Stage::Reconcile => "reconcile",
            Stage::Persist => "persist",
            Stage::Project => "project",
        };
        f.write_str(name)
    }
}

/// Core error type for vesting operations
#[derive(Debug, Error)]
pub enum VestingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Consistency error: {message}")]
    Consistency {
        message: String,
        #[source]
        source: Option<Box<VestingError>>,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Grant {grant_id} failed during {stage}: {source}")]
    Grant {
        grant_id: GrantId,
        stage: Stage,
        #[source]
        source: Box<VestingError>,
    },
}

impl VestingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn consistency(msg: impl Into<String>, source: Option<VestingError>) -> Self {
        Self::Consistency {
            message: msg.into(),
            source: source.map(Box::new),
        }
    }

    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Box::new(err))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Attach grant and stage context. Already-wrapped errors are left alone
    /// so the innermost stage is the one reported.
    pub fn in_grant(self, grant_id: &GrantId, stage: Stage) -> Self {
        match self {
            err @ Self::Grant { .. } => err,
            err => Self::Grant {
                grant_id: grant_id.clone(),
                stage,
                source: Box::new(err),
            },
        }
    }

    /// The error with any grant context stripped
    pub fn root(&self) -> &VestingError {
        match self {
            Self::Grant { source, .. } => source.root(),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, VestingError>;
