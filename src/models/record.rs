//! Content records and the id generator.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::{Map, Value};

use crate::errors::StoreError;

/// One item of a collection: a field mapping carrying a numeric `id`.
pub type Record = Map<String, Value>;

/// Field holding the record identifier.
pub const ID_FIELD: &str = "id";

/// Read the identifier of a record.
///
/// Older content may carry the id as a numeric string, so both forms are accepted.
pub fn record_id(record: &Record) -> Option<i64> {
    match record.get(ID_FIELD)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether `record` is identified by `id`.
pub fn has_id(record: &Record, id: i64) -> bool {
    record_id(record) == Some(id)
}

/// Shallow field overwrite: every field of `patch` replaces the one in `target`, all other
/// fields of `target` are kept. The target's `id` never changes.
pub fn merge_fields(target: &mut Record, patch: &Record) {
    for (field, value) in patch {
        if field == ID_FIELD {
            continue;
        }
        target.insert(field.clone(), value.clone());
    }
}

/// Schema validation for list-valued content.
pub struct RecordList;

impl RecordList {
    /// Validate a stored value as a list of records.
    ///
    /// A missing value (`null`) is an empty list. Anything that is not an array is rejected.
    /// Non-object items inside an array are dropped with a warning so one bad entry does not
    /// discard the whole collection on the next write.
    pub fn parse(value: &Value) -> Result<Vec<Record>, StoreError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record.clone()),
                    other => {
                        tracing::warn!("Dropping non-record list item: {}", other);
                        None
                    }
                })
                .collect()),
            Value::Object(_) => Err(StoreError::Shape("expected a list, found an object".into())),
            other => Err(StoreError::Shape(format!("expected a list, found {}", other))),
        }
    }

    /// Like [`RecordList::parse`], but coerces invalid values to an empty list.
    pub fn parse_or_empty(key: &str, value: &Value) -> Vec<Record> {
        Self::parse(value).unwrap_or_else(|err| {
            tracing::warn!("Treating '{}' as empty: {}", key, err);
            Vec::new()
        })
    }

    pub fn to_value(records: Vec<Record>) -> Value {
        Value::Array(records.into_iter().map(Value::Object).collect())
    }
}

/// Hands out current-time-based record ids (epoch milliseconds).
///
/// Ids are strictly increasing within the process, so two records created in the same
/// millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}
