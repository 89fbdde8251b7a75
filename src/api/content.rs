//! Public content endpoints.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde_json::{json, Value};

use super::{parse_content_key, request_locale, success, ApiResult, LocaleQuery};
use crate::models::ContentKey;
use crate::AppState;

/// Number of events featured on the home page.
const HOME_EVENT_COUNT: usize = 3;

/// GET /api/content/:key - Any content in the visitor's language.
pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    let key = parse_content_key(&key)?;
    let locale = request_locale(&query, &headers);
    success(state.store.get_localized(key, locale).await)
}

/// GET /api/pages/home - Home document plus the first few events.
pub async fn home_page(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    let locale = request_locale(&query, &headers);
    let home = state.store.get_localized(ContentKey::Home, locale).await;
    let events = match state.store.get_localized(ContentKey::Events, locale).await {
        Value::Array(events) => events.into_iter().take(HOME_EVENT_COUNT).collect(),
        _ => Vec::new(),
    };
    success(json!({ "home": home, "events": events }))
}

/// GET /api/pages/about - About document plus the team.
pub async fn about_page(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    let locale = request_locale(&query, &headers);
    let about = state.store.get_localized(ContentKey::About, locale).await;
    let team = state.store.get_localized(ContentKey::Team, locale).await;
    success(json!({ "about": about, "team": team }))
}
