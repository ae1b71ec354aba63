//! Resolution cache shared by all resolutions of one toolchain instance.
//!
//! Entries are never evicted. Each identity has its own slot lock, so two
//! threads resolving the same identity run the computation once while
//! different identities resolve in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::dependency::ResolvedTarget;

/// A cached outcome: a target, or None for a known pseudo-dependency.
pub type CachedResolution = Option<ResolvedTarget>;

type Slot = Arc<Mutex<Option<CachedResolution>>>;

/// Normalized identity -> resolution outcome.
#[derive(Default)]
pub struct ResolutionCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = lock(&self.slots);
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    /// Cached outcome for `key`, if one was stored.
    pub fn get(&self, key: &str) -> Option<CachedResolution> {
        let slot = lock(&self.slots).get(key).cloned()?;
        let value = lock(&slot).clone();
        value
    }

    /// Return the cached outcome or compute and store it.
    ///
    /// Errors from `compute` are returned and nothing is stored, so a later
    /// call retries.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<CachedResolution, E>,
    ) -> Result<CachedResolution, E> {
        let slot = self.slot(key);
        let mut entry = lock(&slot);
        if let Some(cached) = entry.as_ref() {
            tracing::trace!("resolution cache hit: {}", key);
            return Ok(cached.clone());
        }

        let value = compute()?;
        *entry = Some(value.clone());
        Ok(value)
    }

    /// Number of stored outcomes.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A poisoned lock only means another resolution panicked; the map itself is
/// still consistent because slots are written in a single assignment.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
