use crate::resource::ResourceId;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of identifiers already claimed by a branch of the current crawl.
///
/// The lock is only held for the membership check-and-insert and never
/// across an await point.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    visited: Mutex<HashSet<ResourceId>>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `id`. Returns true only for the caller that inserted
    /// it; every later or concurrent caller gets false.
    pub fn try_visit(&self, id: &ResourceId) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.contains(id) {
            return false;
        }
        visited.insert(id.clone())
    }

    pub fn len(&self) -> usize {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
