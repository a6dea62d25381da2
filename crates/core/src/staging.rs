//! Transient staging area for draft batches awaiting commit.
//!
//! Holds at most one batch per caller scope (the authenticated email).
//! Saving replaces the scope's batch wholesale; there is no merging or
//! versioning. Scopes are isolated so concurrent callers cannot clobber
//! each other's staged work.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::catalog::CatalogEntity;

/// Per-scope staging store. Cheaply cloneable; clones share state.
#[derive(Debug, Clone, Default)]
pub struct StagingStore {
    inner: Arc<RwLock<HashMap<String, Vec<CatalogEntity>>>>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scope's staged batch wholesale. Last writer wins
    /// within a scope.
    pub fn save(&self, scope: &str, batch: Vec<CatalogEntity>) {
        let mut map = self.inner.write().expect("staging lock poisoned");
        map.insert(scope.to_string(), batch);
    }

    /// The scope's current batch, or empty if nothing is staged.
    pub fn get(&self, scope: &str) -> Vec<CatalogEntity> {
        let map = self.inner.read().expect("staging lock poisoned");
        map.get(scope).cloned().unwrap_or_default()
    }

    /// Discard the scope's staged batch.
    pub fn clear(&self, scope: &str) {
        let mut map = self.inner.write().expect("staging lock poisoned");
        map.remove(scope);
    }
}
