//! Per-entity write serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of per-entity async mutexes.
///
/// Holding an `EntityWriteGuard` for a persistence id excludes every other
/// writer of that id on the same journal. Entries are removed once no writer
/// holds or waits on them.
#[derive(Default)]
pub(crate) struct EntityLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub(crate) async fn lock(&self, persistence_id: &str) -> EntityWriteGuard<'_> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(persistence_id.to_string()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        EntityWriteGuard {
            locks: self,
            persistence_id: persistence_id.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub(crate) struct EntityWriteGuard<'a> {
    locks: &'a EntityLocks,
    persistence_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntityWriteGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the table itself still references the mutex: nobody is waiting.
        if locks
            .get(&self.persistence_id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.persistence_id);
        }
    }
}
