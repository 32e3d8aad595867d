//! Session-scoped memoization of resolved dependency sets.
//!
//! The cache maps a module's canonical identity to the full set of canonical
//! identities it transitively depends on. Entries are immutable once
//! inserted: a node's dependency set is computed exactly once per session and
//! handed out as a shared [`Arc`] thereafter. Failed resolutions are cached
//! too (as empty sets) - failure is sticky and never retried.
//!
//! The cache is owned by a [`DependencyResolver`](super::DependencyResolver)
//! build session rather than living in process-wide static state, so its
//! lifetime is explicit and tests get a fresh cache per resolver.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use super::module_id::ModuleId;

/// Lock-free map from module identity to its resolved dependency set.
#[derive(Debug, Default)]
pub struct DependencyCache {
    entries: DashMap<ModuleId, Arc<HashSet<ModuleId>>>,
}

impl DependencyCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dependency set for `id`, if resolution completed.
    #[must_use]
    pub fn get(&self, id: &ModuleId) -> Option<Arc<HashSet<ModuleId>>> {
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a completed dependency set exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.entries.contains_key(id)
    }

    /// Records the resolved dependency set for `id` and returns the shared
    /// handle that subsequent [`get`](Self::get) calls will observe.
    ///
    /// Once inserted, a set is never mutated or replaced: if an entry already
    /// exists (a concurrent walk finished first), the existing set wins.
    pub fn insert(&self, id: ModuleId, dependencies: HashSet<ModuleId>) -> Arc<HashSet<ModuleId>> {
        let set = Arc::new(dependencies);
        let entry = self.entries.entry(id).or_insert_with(|| Arc::clone(&set));
        Arc::clone(entry.value())
    }

    /// Number of cached modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all cached module identities.
    #[must_use]
    pub fn modules(&self) -> Vec<ModuleId> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}
