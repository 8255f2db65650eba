//! Environment cache with at-most-once construction per artifact.
//!
//! # Concurrency Model
//!
//! Each artifact identity owns a *slot*: an `Arc<Mutex<Option<Arc<Environment>>>>`
//! stored in a [`DashMap`]. A request:
//!
//! 1. Fetches (or inserts) the slot and drops the map guard immediately
//! 2. Locks the slot
//! 3. Returns the stored environment if present, otherwise runs the build
//!    function while still holding the slot lock and stores the result
//!
//! Concurrent requests for the same identity therefore serialize on the slot and
//! all observe the instance built by the first one. Requests for different
//! identities only share the map shard for the duration of the slot lookup, so a
//! build function may itself request other identities (provider environments)
//! without deadlocking. Slots are locked in requirement order, which the resolver
//! guarantees is acyclic.
//!
//! A failed build leaves the slot empty: the error goes to the caller that ran the
//! build, and the next request for that identity builds again. An empty slot that
//! no other request is waiting on is removed from the map.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::debug;

use crate::core::{Artifact, ArtifactId, ExtenvError};
use crate::environment::Environment;

type Slot = Arc<Mutex<Option<Arc<Environment>>>>;

/// Manager-lifetime map from artifact identity to its constructed environment.
#[derive(Debug, Default)]
pub struct EnvironmentCache {
    slots: DashMap<ArtifactId, Slot>,
}

impl EnvironmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &ArtifactId) -> Slot {
        // Clone the Arc out so the shard guard is released before the slot is locked
        self.slots.entry(id.clone()).or_default().value().clone()
    }

    /// Return the cached environment of `artifact`, building it with `build` first
    /// if needed.
    ///
    /// `build` runs at most once per identity across all threads, unless it fails;
    /// failures are returned and not stored.
    pub fn get_or_build<F>(&self, artifact: &Artifact, build: F) -> Result<Arc<Environment>, ExtenvError>
    where
        F: FnOnce() -> Result<Environment, ExtenvError>,
    {
        let slot = self.slot(artifact.id());
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(env) = guard.as_ref() {
            debug!(target: "cache", "Cache hit for {}", artifact.file_name());
            return Ok(Arc::clone(env));
        }

        debug!(target: "cache", "Cache miss for {}, building", artifact.file_name());
        match build() {
            Ok(env) => {
                let env = Arc::new(env);
                *guard = Some(Arc::clone(&env));
                Ok(env)
            }
            Err(e) => {
                drop(guard);
                self.release_empty_slot(artifact.id(), &slot);
                Err(e)
            }
        }
    }

    /// Drop the map entry for `id` if it is still `slot`, nobody else holds it and
    /// it is empty.
    ///
    /// Runs under the shard write lock, so no other caller can clone the slot
    /// between the count check and the removal.
    fn release_empty_slot(&self, id: &ArtifactId, slot: &Slot) {
        let removed = self.slots.remove_if(id, |_, current| {
            Arc::ptr_eq(current, slot)
                && Arc::strong_count(current) == 2
                && current.try_lock().is_ok_and(|guard| guard.is_none())
        });
        if removed.is_some() {
            debug!(target: "cache", "Released empty slot for {id}");
        }
    }

    /// The cached environment for `id`, if one has been built.
    ///
    /// Blocks while a build for `id` is in progress.
    pub fn get(&self, id: &ArtifactId) -> Option<Arc<Environment>> {
        let slot = self.slots.get(id)?.value().clone();
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Whether an environment for `id` has been built.
    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.get(id).is_some()
    }

    /// Number of built environments.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.iter().map(|entry| entry.value().clone()).collect();
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
