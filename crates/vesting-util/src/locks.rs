//! Per-grant regeneration locks
//!
//! At most one regeneration may run for a given grant at a time. A second
//! caller for the same grant blocks until the first guard is dropped;
//! callers working on different grants never wait on each other.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::GrantId;

/// Registry of grants with a regeneration in flight
#[derive(Debug, Default)]
pub struct GrantLocks {
    in_flight: Mutex<HashSet<GrantId>>,
    released: Condvar,
}

impl GrantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self) -> MutexGuard<'_, HashSet<GrantId>> {
        // The set only holds ids; a panic elsewhere can't leave it half-updated
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until no other caller holds `grant_id`, then take it
    pub fn acquire(&self, grant_id: &GrantId) -> GrantLockGuard<'_> {
        let mut set = self.set();
        while set.contains(grant_id) {
            tracing::debug!(grant_id = %grant_id, "Waiting for in-flight regeneration");
            set = self
                .released
                .wait(set)
                .unwrap_or_else(|e| e.into_inner());
        }
        set.insert(grant_id.clone());

        GrantLockGuard {
            locks: self,
            grant_id: grant_id.clone(),
        }
    }

    /// Whether a regeneration is currently running for `grant_id`
    pub fn is_held(&self, grant_id: &GrantId) -> bool {
        self.set().contains(grant_id)
    }
}

/// Releases the grant when dropped
#[derive(Debug)]
pub struct GrantLockGuard<'a> {
    locks: &'a GrantLocks,
    grant_id: GrantId,
}

impl Drop for GrantLockGuard<'_> {
    fn drop(&mut self) {
        self.locks.set().remove(&self.grant_id);
        self.locks.released.notify_all();
    }
}
