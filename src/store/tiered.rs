//! Key/value content store layered over the document cache, the remote document and the
//! local JSON files.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use super::cache::DocumentCache;
use super::clock::{Clock, SystemClock};
use super::local::LocalFileStore;
use super::localize::localize;
use super::remote::{Document, RemoteDocumentClient};
use crate::config::Config;
use crate::errors::StoreError;
use crate::models::{ContentKey, Locale, Record, RecordList};

/// Content store resolving reads cache → remote → local file → default.
pub struct TieredStore {
    local: LocalFileStore,
    remote: Option<RemoteDocumentClient>,
    cache: Mutex<DocumentCache>,
    /// Serializes read-modify-write cycles on the remote document.
    write_lock: Mutex<()>,
}

impl TieredStore {
    pub fn new(
        local: LocalFileStore,
        remote: Option<RemoteDocumentClient>,
        cache: DocumentCache,
    ) -> Self {
        Self {
            local,
            remote,
            cache: Mutex::new(cache),
            write_lock: Mutex::new(()),
        }
    }

    /// Build the store from configuration, using the system clock.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let remote = match config.content_remote() {
            Some(target) => Some(RemoteDocumentClient::new(target, config.http_timeout)?),
            None => None,
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self::new(
            LocalFileStore::new(&config.content_dir),
            remote,
            DocumentCache::new(clock, config.cache_ttl),
        ))
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// The remote document, from cache while fresh, otherwise freshly fetched.
    ///
    /// Returns `None` when the remote is unconfigured or the fetch fails; a failed fetch
    /// leaves the previously cached document untouched.
    pub async fn fetch_document(&self) -> Option<Arc<Document>> {
        let remote = self.remote.as_ref()?;

        let generation = {
            let cache = self.cache.lock().await;
            if let Some(document) = cache.fresh() {
                return Some(document);
            }
            cache.generation()
        };

        match remote.fetch_document().await {
            Ok(document) => {
                let document = Arc::new(document);
                let mut cache = self.cache.lock().await;
                if cache.store_if_unchanged(Arc::clone(&document), generation) {
                    return Some(document);
                }
                // A write landed while this fetch was in flight; its document is newer.
                tracing::debug!("Discarding remote fetch superseded by a write");
                cache
                    .entry()
                    .map(|entry| Arc::clone(&entry.document))
                    .or(Some(document))
            }
            Err(err) => {
                tracing::warn!("Remote content fetch failed, using local files: {}", err);
                None
            }
        }
    }

    /// Read `key`, falling back to `default` when no tier holds it.
    ///
    /// Reads never write to the local files.
    pub async fn get(&self, key: &str, default: Value) -> Value {
        if let Some(document) = self.fetch_document().await {
            match document.get(key) {
                Some(value) if !value.is_null() => return value.clone(),
                _ => tracing::debug!("Key '{}' not in remote document", key),
            }
        }

        if !self.local.exists(key).await {
            return default;
        }
        match self.local.read(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::warn!("Could not read local content '{}': {}", key, err);
                default
            }
        }
    }

    /// Read a list collection, coercing malformed values to an empty list.
    pub async fn get_list(&self, key: &str) -> Vec<Record> {
        let value = self.get(key, Value::Array(Vec::new())).await;
        RecordList::parse_or_empty(key, &value)
    }

    /// Read content in the given locale.
    ///
    /// Tamil reads overlay the translated value onto the canonical one, so missing
    /// translations show the English text.
    pub async fn get_localized(&self, key: ContentKey, locale: Locale) -> Value {
        let default = if key.is_list() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Default::default())
        };

        let canonical = self
            .get(&key.in_locale(Locale::En).storage_key(), default.clone())
            .await;
        match locale {
            Locale::En => canonical,
            Locale::Ta => {
                let translated = self
                    .get(&key.in_locale(Locale::Ta).storage_key(), Value::Null)
                    .await;
                localize(&canonical, &translated)
            }
        }
    }

    /// Persist `value` under `key`.
    ///
    /// The local file is always written first. With a remote configured, the latest remote
    /// document is fetched, `key` is replaced in it and the whole document is written back.
    /// Returns `false` if the local write failed or the remote write could not be completed.
    pub async fn save(&self, key: &str, value: Value) -> bool {
        let local_ok = match self.local.write(key, &value).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Error writing local file for '{}': {}", key, err);
                false
            }
        };

        let Some(remote) = self.remote.as_ref() else {
            return local_ok;
        };

        let _guard = self.write_lock.lock().await;

        // Never write back a document we could not read: it would drop every sibling key.
        let mut document = match remote.fetch_document().await {
            Ok(document) => document,
            Err(err) => {
                tracing::error!("Error saving '{}': could not read remote document: {}", key, err);
                return false;
            }
        };
        document.insert(key.to_string(), value);

        match remote.replace(&document).await {
            Ok(()) => {
                self.cache.lock().await.store(Arc::new(document));
                tracing::debug!("Saved '{}' to remote document", key);
                local_ok
            }
            Err(err) => {
                tracing::error!("Error saving '{}' to remote document: {}", key, err);
                false
            }
        }
    }
}
