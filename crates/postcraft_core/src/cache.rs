//! crates/postcraft_core/src/cache.rs
//!
//! In-memory `ProfileCache` with a fixed time-to-live. A stale entry is dropped
//! when it is read, and every `set` sweeps the map so profiles of users who never
//! come back do not accumulate.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::Profile;
use crate::ports::ProfileCache;

struct CachedProfile {
    profile: Profile,
    inserted_at: Instant,
}

pub struct TtlProfileCache {
    ttl: Duration,
    entries: DashMap<Uuid, CachedProfile>,
}

impl TtlProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Removes every entry older than the TTL.
    pub fn purge_expired(&self) {
        self.entries
            .retain(|_, cached| cached.inserted_at.elapsed() < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProfileCache for TtlProfileCache {
    fn get(&self, user_id: Uuid) -> Option<Profile> {
        if let Some(entry) = self.entries.get(&user_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.profile.clone());
            }
        }
        // The read guard above is released before touching the shard again.
        self.entries
            .remove_if(&user_id, |_, cached| cached.inserted_at.elapsed() >= self.ttl);
        None
    }

    fn set(&self, profile: Profile) {
        self.purge_expired();
        self.entries.insert(
            profile.user_id,
            CachedProfile {
                profile,
                inserted_at: Instant::now(),
            },
        );
    }

    fn expire(&self, user_id: Uuid) {
        self.entries.remove(&user_id);
    }
}
