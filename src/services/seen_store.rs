use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::Listing;

/// Every listing discovered since the process started, keyed by identity.
///
/// Never pruned. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SeenStore {
    items: Arc<Mutex<HashMap<String, Listing>>>,
}

impl SeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Listing>> {
        // a panic elsewhere cannot leave the map half-written: every write is a single insert
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the unseen candidates and returns them in input order.
    ///
    /// The whole batch is checked and inserted under one lock, so two concurrent calls
    /// never both report the same identity.
    pub fn filter_new(&self, candidates: Vec<Listing>) -> Vec<Listing> {
        let mut items = self.lock();

        candidates
            .into_iter()
            .filter(|listing| {
                if items.contains_key(&listing.id) {
                    return false;
                }
                items.insert(listing.id.clone(), listing.clone());
                true
            })
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
