//! Time-boxed cache of the remote content document.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::clock::Clock;
use super::remote::Document;

/// A fetched document and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub document: Arc<Document>,
    pub fetched_at: DateTime<Utc>,
}

/// Holds the last successfully fetched remote document.
///
/// An entry is fresh while `now - fetched_at < ttl`. Entries are only ever replaced, never
/// invalidated: a failed refresh leaves the previous entry in place.
///
/// Every store bumps a generation counter. A refresh records the generation before its fetch
/// and only lands if nothing was stored in the meantime.
pub struct DocumentCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: Option<CacheEntry>,
    generation: u64,
}

impl DocumentCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: std::time::Duration) -> Self {
        Self {
            clock,
            ttl: Duration::from_std(ttl).unwrap_or(Duration::seconds(30)),
            entry: None,
            generation: 0,
        }
    }

    /// The cached document if it is fresh and non-empty.
    pub fn fresh(&self) -> Option<Arc<Document>> {
        let entry = self.entry.as_ref()?;
        let age = self.clock.now() - entry.fetched_at;
        if age < self.ttl && !entry.document.is_empty() {
            Some(Arc::clone(&entry.document))
        } else {
            None
        }
    }

    /// The cached entry regardless of age.
    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the cached document, stamping it with the current time.
    pub fn store(&mut self, document: Arc<Document>) {
        self.entry = Some(CacheEntry {
            document,
            fetched_at: self.clock.now(),
        });
        self.generation += 1;
    }

    /// Store a document fetched after `generation` was observed.
    ///
    /// Returns `false`, leaving the newer entry in place, if another store happened since.
    pub fn store_if_unchanged(&mut self, document: Arc<Document>, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.store(document);
        true
    }
}
