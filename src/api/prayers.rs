//! Public prayer wall endpoints.

use std::cmp::Reverse;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{request_locale, success, ApiResult, LocaleQuery};
use crate::errors::AppError;
use crate::models::{
    has_id, ContentKey, CreatePrayerRequest, CreatedRecord, PrayQuery, PrayedCount, Record,
    ID_FIELD,
};
use crate::store::SyncAction;
use crate::AppState;

const PRAYED_COUNT_FIELD: &str = "prayedCount";

fn is_confidential(prayer: &Value) -> bool {
    prayer
        .get("confidential")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn prayer_date(prayer: &Value) -> Option<DateTime<Utc>> {
    prayer
        .get("date")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|date| date.with_timezone(&Utc))
}

/// Public prayers, newest first. Undated prayers sort last.
pub fn prayer_wall(prayers: Value) -> Vec<Value> {
    let mut visible: Vec<Value> = match prayers {
        Value::Array(items) => items.into_iter().filter(|p| !is_confidential(p)).collect(),
        _ => Vec::new(),
    };
    visible.sort_by_key(|p| Reverse(prayer_date(p)));
    visible
}

/// GET /api/prayers - The public prayer wall.
pub async fn list_prayers(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> ApiResult<Vec<Value>> {
    let locale = request_locale(&query, &headers);
    let prayers = state
        .store
        .get_localized(ContentKey::Prayers, locale)
        .await;
    success(prayer_wall(prayers))
}

/// POST /api/prayers - Submit a prayer request.
pub async fn submit_prayer(
    State(state): State<AppState>,
    Json(request): Json<CreatePrayerRequest>,
) -> ApiResult<CreatedRecord> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let id = state.ids.next_id();
    let mut prayer = Record::new();
    prayer.insert(ID_FIELD.to_string(), Value::from(id));
    prayer.insert("name".to_string(), Value::from(request.name));
    prayer.insert("message".to_string(), Value::from(request.message));
    prayer.insert("confidential".to_string(), Value::from(request.confidential));
    prayer.insert("date".to_string(), Value::from(Utc::now().to_rfc3339()));
    prayer.insert(PRAYED_COUNT_FIELD.to_string(), Value::from(0));

    let outcome = state
        .sync
        .apply(
            ContentKey::Prayers,
            SyncAction::Create {
                en: prayer.clone(),
                ta: prayer,
            },
        )
        .await?;
    if !outcome.persisted {
        return Err(AppError::Storage("Prayer request could not be saved".to_string()));
    }

    tracing::info!("Prayer request {} submitted", id);
    success(CreatedRecord { id })
}

/// POST /api/prayers/:id/pray - Count (or with `?action=undo`, uncount) a prayer.
pub async fn pray(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PrayQuery>,
) -> ApiResult<PrayedCount> {
    let undo = query.action.as_deref() == Some("undo");
    let mut new_count = None;

    let outcome = state
        .sync
        .apply_with(ContentKey::Prayers, |prayers| {
            let prayer = prayers.iter().find(|p| has_id(p, id))?;
            let count = next_prayed_count(prayer, undo);
            new_count = Some(count);

            let mut patch = Record::new();
            patch.insert(PRAYED_COUNT_FIELD.to_string(), Value::from(count));
            Some(SyncAction::Update {
                id,
                en: patch.clone(),
                ta: patch,
            })
        })
        .await?;

    let (Some(outcome), Some(new_count)) = (outcome, new_count) else {
        return Err(AppError::NotFound(format!("Prayer {} not found", id)));
    };
    if !outcome.persisted {
        return Err(AppError::Storage("Prayer count could not be saved".to_string()));
    }

    success(PrayedCount { new_count })
}

fn next_prayed_count(prayer: &Record, undo: bool) -> i64 {
    let current = prayer
        .get(PRAYED_COUNT_FIELD)
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if undo {
        (current - 1).max(0)
    } else {
        current + 1
    }
}
