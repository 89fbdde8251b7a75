//! Media uploads for the admin panel.

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use chrono::Utc;
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

/// Directories uploads may be filed under.
const UPLOAD_CATEGORIES: [&str; 4] = ["team", "gallery", "events", "sermons"];

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Where an uploaded file ended up, as referenced from content records.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub path: String,
}

/// Generate a unique file name keeping the original extension.
pub fn unique_file_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| FsPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple(),
        extension
    )
}

/// POST /api/admin/uploads/:category - Store a file and return its public path.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<UploadedFile> {
    if !UPLOAD_CATEGORIES.contains(&category.as_str()) {
        return Err(AppError::NotFound(format!(
            "Unknown upload category '{}'",
            category
        )));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = unique_file_name(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;

        let dir = state.config.upload_dir.join(&category);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), &bytes).await?;

        let path = format!("/uploads/{}/{}", category, file_name);
        tracing::info!("Stored upload {} ({} bytes)", path, bytes.len());
        return success(UploadedFile { path });
    }

    Err(AppError::Validation(format!(
        "Missing '{}' field",
        FILE_FIELD
    )))
}
