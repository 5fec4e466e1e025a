use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// `reference -> local id` for every stored vacancy carrying a reference.
pub type ReferenceSnapshot = BTreeMap<String, Uuid>;

#[derive(Debug)]
struct CachedSnapshot {
    stored_at: Instant,
    snapshot: ReferenceSnapshot,
}

/// Time-bounded cache of the last reference snapshot. A zero TTL disables it.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entry: Arc<Mutex<Option<CachedSnapshot>>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Arc::new(Mutex::new(None)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn get(&self) -> Option<ReferenceSnapshot> {
        if self.ttl.is_zero() {
            return None;
        }
        let mut guard = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        match guard.as_ref() {
            Some(cached) if cached.stored_at.elapsed() < self.ttl => Some(cached.snapshot.clone()),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    pub fn put(&self, snapshot: ReferenceSnapshot) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(CachedSnapshot {
            stored_at: Instant::now(),
            snapshot,
        });
    }

    pub fn invalidate(&self) {
        let mut guard = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }
}
