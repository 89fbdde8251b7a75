//! Keeps the canonical and translated lists of a bilingual collection aligned by id.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use super::tiered::TieredStore;
use crate::errors::StoreError;
use crate::models::{has_id, merge_fields, ContentKey, Locale, Record, RecordList, ID_FIELD};

/// A change to apply to both locale lists of a collection.
#[derive(Debug, Clone)]
pub enum SyncAction {
    /// Append `en` to the canonical list and `ta` to the translated list.
    Create { en: Record, ta: Record },
    /// Merge `en` / `ta` into the record with `id` in each list.
    Update { id: i64, en: Record, ta: Record },
    /// Remove the record with `id` from both lists.
    Delete { id: i64 },
}

/// What happened to each list during an apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub canonical_changed: bool,
    pub translated_changed: bool,
    /// False if any save of a changed list reported failure.
    pub persisted: bool,
}

/// Apply `action` to an in-memory pair of lists.
///
/// Returns which lists changed. A missing id is a no-op for that list.
pub fn apply_to_lists(
    canonical: &mut Vec<Record>,
    translated: &mut Vec<Record>,
    action: SyncAction,
) -> (bool, bool) {
    match action {
        SyncAction::Create { en, mut ta } => {
            if let (Some(id), None) = (en.get(ID_FIELD).cloned(), ta.get(ID_FIELD)) {
                ta.insert(ID_FIELD.to_string(), id);
            }
            canonical.push(en);
            translated.push(ta);
            (true, true)
        }
        SyncAction::Update { id, en, ta } => {
            let canonical_hit = canonical.iter_mut().find(|r| has_id(r, id));
            let in_canonical = canonical_hit.is_some();
            if let Some(record) = canonical_hit {
                merge_fields(record, &en);
            }

            match translated.iter_mut().find(|r| has_id(r, id)) {
                Some(record) => {
                    merge_fields(record, &ta);
                    (in_canonical, true)
                }
                None if in_canonical => {
                    let mut healed = ta;
                    healed.insert(ID_FIELD.to_string(), Value::from(id));
                    translated.push(healed);
                    (true, true)
                }
                None => (false, false),
            }
        }
        SyncAction::Delete { id } => {
            let before = (canonical.len(), translated.len());
            canonical.retain(|r| !has_id(r, id));
            translated.retain(|r| !has_id(r, id));
            (canonical.len() != before.0, translated.len() != before.1)
        }
    }
}

/// Applies create/update/delete to both locale lists of a collection and persists them.
pub struct LocalePairSync {
    store: Arc<TieredStore>,
    /// Serializes applies so two admin edits cannot interleave their read and write.
    lock: Mutex<()>,
}

impl LocalePairSync {
    pub fn new(store: Arc<TieredStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Apply `action` to `key` and `key_ta`.
    ///
    /// Stored values that are not lists are treated as empty. Changed lists are saved
    /// canonical first, then translated; the two saves are independent, so a failure of the
    /// second leaves the pair out of step until the next successful write.
    pub async fn apply(&self, key: ContentKey, action: SyncAction) -> Result<SyncOutcome, StoreError> {
        let outcome = self.apply_with(key, |_| Some(action)).await?;
        Ok(outcome.unwrap_or_default())
    }

    /// Like [`apply`](Self::apply), but the action is derived from the current canonical list.
    ///
    /// `decide` runs while applies are locked out, so the read it bases its action on cannot
    /// be overtaken by another apply. Returning `None` leaves both lists untouched and yields
    /// `Ok(None)`.
    pub async fn apply_with<F>(&self, key: ContentKey, decide: F) -> Result<Option<SyncOutcome>, StoreError>
    where
        F: FnOnce(&[Record]) -> Option<SyncAction>,
    {
        if !key.is_list() {
            return Err(StoreError::Shape(format!("'{}' is not a list collection", key)));
        }

        let canonical_key = key.in_locale(Locale::En).storage_key();
        let translated_key = key.in_locale(Locale::Ta).storage_key();

        let _guard = self.lock.lock().await;

        let mut canonical = self.store.get_list(&canonical_key).await;
        let Some(action) = decide(&canonical) else {
            return Ok(None);
        };
        let mut translated = self.store.get_list(&translated_key).await;

        let (canonical_changed, translated_changed) =
            apply_to_lists(&mut canonical, &mut translated, action);

        let mut persisted = true;
        if canonical_changed {
            persisted &= self
                .store
                .save(&canonical_key, RecordList::to_value(canonical))
                .await;
        }
        if translated_changed {
            persisted &= self
                .store
                .save(&translated_key, RecordList::to_value(translated))
                .await;
        }

        if !persisted {
            tracing::error!("Locale pair '{}' may be out of sync: a save failed", key);
        }

        Ok(Some(SyncOutcome {
            canonical_changed,
            translated_changed,
            persisted,
        }))
    }
}
