//! Per-id write locks.
//!
//! One mutex per id, created on demand and dropped once no writer holds or
//! waits on it. Writers to different ids never contend here.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::warn;

use saga_core::errors::{SagaError, SagaResult};

pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl KeyLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// Run `f` while holding the lock for `id`.
    ///
    /// Fails with `ConcurrentModification`, without running `f`, if the lock
    /// is not acquired within the timeout.
    pub fn with_lock<R>(&self, id: &str, f: impl FnOnce() -> SagaResult<R>) -> SagaResult<R> {
        let entry = LockEntry {
            locks: &self.locks,
            id,
            lock: Arc::clone(self.locks.entry(id.to_owned()).or_default().value()),
        };

        let acquired = entry.lock.try_lock_for(self.timeout);
        match acquired {
            Some(_guard) => f(),
            None => {
                warn!(id = %id, timeout_ms = self.timeout.as_millis() as u64, "id lock timed out");
                Err(SagaError::concurrent(
                    id,
                    format!("lock not acquired within {}ms", self.timeout.as_millis()),
                ))
            }
        }
    }

    /// Number of ids with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// One caller's reference to an id's mutex. Dropping it, on return or
/// unwind, removes the map entry once nobody else holds or waits on it.
struct LockEntry<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    id: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        // Only the map's reference and this one left.
        self.locks.remove_if(self.id, |_, l| Arc::strong_count(l) == 2);
    }
}
