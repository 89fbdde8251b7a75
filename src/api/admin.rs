//! Admin panel endpoints: login, dashboard, and bilingual content editing.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use super::{parse_document_key, parse_list_key, success, ApiResult};
use crate::auth::{credentials_match, session_token};
use crate::errors::AppError;
use crate::models::{
    ContentKey, CreatedRecord, DashboardStats, Locale, LocalizedContent, LocalizedRecordRequest,
    LoginRequest, LoginResponse, Record, RecordList, ID_FIELD,
};
use crate::store::SyncAction;
use crate::AppState;

/// Copy the shared fields into a per-locale record. Shared fields win over locale fields.
fn with_shared(mut record: Record, shared: &Record) -> Record {
    for (field, value) in shared {
        if field != ID_FIELD {
            record.insert(field.clone(), value.clone());
        }
    }
    record
}

/// POST /api/admin/login - Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let settings = state.settings.get_settings().await;
    if !credentials_match(&settings, &request.username, &request.password) {
        tracing::warn!("Failed admin login for '{}'", request.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.sessions.create().await;
    tracing::info!("Admin '{}' logged in", request.username);
    success(LoginResponse { token })
}

/// POST /api/admin/logout - End the current session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    success(())
}

/// GET /api/admin/dashboard - Record counts.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let store = &state.store;
    success(DashboardStats {
        prayer_count: store.get_list(ContentKey::Prayers.as_str()).await.len(),
        event_count: store.get_list(ContentKey::Events.as_str()).await.len(),
        sermon_count: store.get_list(ContentKey::Sermons.as_str()).await.len(),
    })
}

/// GET /api/admin/collections/:key - Both locale lists of a collection.
pub async fn list_collection(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<LocalizedContent> {
    let key = parse_list_key(&key)?;
    let en = state
        .store
        .get_list(&key.in_locale(Locale::En).storage_key())
        .await;
    let ta = state
        .store
        .get_list(&key.in_locale(Locale::Ta).storage_key())
        .await;
    success(LocalizedContent {
        en: RecordList::to_value(en),
        ta: RecordList::to_value(ta),
    })
}

/// POST /api/admin/collections/:key - Create a record in both locales.
pub async fn create_record(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<LocalizedRecordRequest>,
) -> ApiResult<CreatedRecord> {
    let key = parse_list_key(&key)?;
    if request.shared.is_empty() && request.en.is_empty() {
        return Err(AppError::Validation("Record has no fields".to_string()));
    }

    let id = state.ids.next_id();
    let mut en = with_shared(request.en, &request.shared);
    let mut ta = with_shared(request.ta, &request.shared);
    en.insert(ID_FIELD.to_string(), Value::from(id));
    ta.insert(ID_FIELD.to_string(), Value::from(id));

    let outcome = state.sync.apply(key, SyncAction::Create { en, ta }).await?;
    if !outcome.persisted {
        return Err(AppError::Storage(format!("Could not save {}", key)));
    }

    tracing::info!("Created {} record {}", key, id);
    success(CreatedRecord { id })
}

/// PUT /api/admin/collections/:key/:id - Update a record in both locales.
///
/// An unknown id is a no-op.
pub async fn update_record(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, i64)>,
    Json(request): Json<LocalizedRecordRequest>,
) -> ApiResult<()> {
    let key = parse_list_key(&key)?;
    let en = with_shared(request.en, &request.shared);
    let ta = with_shared(request.ta, &request.shared);

    let outcome = state
        .sync
        .apply(key, SyncAction::Update { id, en, ta })
        .await?;
    if !outcome.persisted {
        return Err(AppError::Storage(format!("Could not save {}", key)));
    }
    if !outcome.canonical_changed && !outcome.translated_changed {
        tracing::debug!("Update of unknown {} record {} ignored", key, id);
    }
    success(())
}

/// DELETE /api/admin/collections/:key/:id - Remove a record from both locales.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((key, id)): Path<(String, i64)>,
) -> ApiResult<()> {
    let key = parse_list_key(&key)?;
    let outcome = state.sync.apply(key, SyncAction::Delete { id }).await?;
    if !outcome.persisted {
        return Err(AppError::Storage(format!("Could not save {}", key)));
    }
    success(())
}

/// GET /api/admin/documents/:key - Both locale variants of a singleton document.
pub async fn get_document(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<LocalizedContent> {
    let key = parse_document_key(&key)?;
    let empty = || Value::Object(Default::default());
    let en = state
        .store
        .get(&key.in_locale(Locale::En).storage_key(), empty())
        .await;
    let ta = state
        .store
        .get(&key.in_locale(Locale::Ta).storage_key(), empty())
        .await;
    success(LocalizedContent { en, ta })
}

/// PUT /api/admin/documents/:key - Replace both locale variants of a singleton document.
pub async fn save_document(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<LocalizedContent>,
) -> ApiResult<()> {
    let key = parse_document_key(&key)?;
    if !request.en.is_object() || !request.ta.is_object() {
        return Err(AppError::Validation(
            "Both 'en' and 'ta' must be objects".to_string(),
        ));
    }

    let canonical_saved = state
        .store
        .save(&key.in_locale(Locale::En).storage_key(), request.en)
        .await;
    let translated_saved = state
        .store
        .save(&key.in_locale(Locale::Ta).storage_key(), request.ta)
        .await;
    if !(canonical_saved && translated_saved) {
        return Err(AppError::Storage(format!("Could not save {}", key)));
    }
    success(())
}
