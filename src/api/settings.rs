//! Admin settings endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{AdminSettings, UpdateSettingsRequest};
use crate::AppState;

/// GET /api/admin/settings - Current admin settings.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<AdminSettings> {
    success(state.settings.get_settings().await)
}

/// PUT /api/admin/settings - Update admin settings.
///
/// Only the fields present in the body change. The stored settings must be readable, so a
/// partial update never falls back to the default credentials.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<AdminSettings> {
    let mut settings = state.settings.load_settings().await?;
    request.apply_to(&mut settings);

    if settings.username.trim().is_empty() || settings.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    if !state.settings.save_settings(&settings).await {
        return Err(AppError::Storage("Admin settings could not be saved".to_string()));
    }
    success(settings)
}
