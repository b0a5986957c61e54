//! Per-service booking locks
//!
//! Optional hardening for the check-then-write sequence. Without it two
//! concurrent bookings of the same service can both pass the conflict query
//! before either writes. With it, bookings touching a common service id run
//! one at a time inside this process. Locks are taken in ascending service
//! id order so overlapping sets cannot deadlock.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::ServiceId;

type LockMap = DashMap<ServiceId, Arc<Mutex<()>>>;

/// One mutex per service id with a booking in flight. Entries are dropped
/// again once no booking holds or waits on them.
#[derive(Default)]
pub struct BookingLocks {
    locks: Arc<LockMap>,
}

/// Held for the duration of one check-and-write
pub struct BookingGuard {
    locks: Arc<LockMap>,
    service_ids: Vec<ServiceId>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, service_ids: &BTreeSet<ServiceId>) -> BookingGuard {
        let mut guards = Vec::with_capacity(service_ids.len());
        for id in service_ids {
            // clone the Arc out so no DashMap shard lock is held across await
            let lock = self.locks.entry(*id).or_default().clone();
            guards.push(lock.lock_owned().await);
        }
        BookingGuard {
            locks: self.locks.clone(),
            service_ids: service_ids.iter().copied().collect(),
            guards,
        }
    }
}

impl Drop for BookingGuard {
    fn drop(&mut self) {
        self.guards.clear();
        for id in &self.service_ids {
            // the map's own Arc is the only one left: nobody holds or waits
            self.locks
                .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}
