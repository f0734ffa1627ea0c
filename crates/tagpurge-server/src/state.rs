//! Application state.

use std::sync::Arc;

use tagpurge_core::TagHasher;
use tagpurge_fastly::{CacheTagsInvalidator, PurgeBackend};

use crate::cache::PurgeDeduplicator;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The CDN being purged.
    backend: Arc<dyn PurgeBackend>,
    /// Turns cache tags into purges against `backend`.
    invalidator: CacheTagsInvalidator,
    /// Keys with a purge in flight, when coalescing is enabled.
    dedup: Option<PurgeDeduplicator>,
}

impl AppState {
    /// Creates a new AppState for the given backend and tag hasher.
    pub fn new(backend: Arc<dyn PurgeBackend>, hasher: TagHasher) -> Self {
        Self {
            invalidator: CacheTagsInvalidator::new(backend.clone(), hasher),
            backend,
            dedup: None,
        }
    }

    /// Enables coalescing of concurrent purges.
    pub fn with_dedup(mut self, dedup: PurgeDeduplicator) -> Self {
        self.dedup = Some(dedup);
        self
    }

    pub fn backend(&self) -> &dyn PurgeBackend {
        self.backend.as_ref()
    }

    pub fn invalidator(&self) -> &CacheTagsInvalidator {
        &self.invalidator
    }

    pub fn hasher(&self) -> &TagHasher {
        self.invalidator.hasher()
    }

    pub fn dedup(&self) -> Option<&PurgeDeduplicator> {
        self.dedup.as_ref()
    }
}
