//! Render-time merging of canonical and translated content.

use serde_json::Value;

use crate::models::{has_id, record_id, Record};

/// Overlay `translated` onto `canonical`.
///
/// List items are matched by `id`; canonical order and membership win, translated items with
/// no canonical counterpart are ignored. Within a record, a translated field replaces the
/// canonical one only when it carries a value (not null, not an empty string). If there is
/// no canonical value at all, the translated value is used as is.
pub fn localize(canonical: &Value, translated: &Value) -> Value {
    match (canonical, translated) {
        (Value::Null, other) => other.clone(),
        (Value::Array(items), Value::Array(translations)) => {
            let translations: Vec<&Record> =
                translations.iter().filter_map(Value::as_object).collect();
            Value::Array(
                items
                    .iter()
                    .map(|item| match item.as_object() {
                        Some(record) => {
                            let translation = record_id(record).and_then(|id| {
                                translations.iter().copied().find(|t| has_id(t, id))
                            });
                            match translation {
                                Some(translation) => Value::Object(overlay(record, translation)),
                                None => item.clone(),
                            }
                        }
                        None => item.clone(),
                    })
                    .collect(),
            )
        }
        (Value::Object(record), Value::Object(translation)) => {
            Value::Object(overlay(record, translation))
        }
        _ => canonical.clone(),
    }
}

fn overlay(canonical: &Record, translated: &Record) -> Record {
    let mut merged = canonical.clone();
    for (field, value) in translated {
        let present = match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        };
        if present {
            merged.insert(field.clone(), value.clone());
        }
    }
    merged
}
