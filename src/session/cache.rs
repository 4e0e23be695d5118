//! DocumentCache - one shared `{body, version}` slot per document path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::store::VersionTag;

/// The last body and version tag observed for a document.
///
/// `version` is `None` when the document did not exist at load time; the
/// next save then creates it.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDocument {
    pub body: Value,
    pub version: Option<VersionTag>,
}

/// Shared slot for one path. `None` until the first successful load.
///
/// Editors hold the async lock for the whole read-modify-write of one
/// operation, so writes on a path are sequenced.
pub type CacheSlot = Arc<tokio::sync::Mutex<Option<CachedDocument>>>;

/// Registry of cache slots keyed by path.
#[derive(Debug, Default)]
pub struct DocumentCache {
    slots: Mutex<HashMap<String, CacheSlot>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `path`, created empty on first use. Every caller asking
    /// for the same path gets the same slot.
    pub fn slot(&self, path: &str) -> CacheSlot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(path.to_string()).or_default().clone()
    }

    /// Paths with a slot.
    pub fn paths(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<String> = slots.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every slot. Editors still holding a slot keep their copy.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
