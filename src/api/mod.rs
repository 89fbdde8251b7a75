//! REST API module.
//!
//! Public content reads, the prayer wall, and the admin panel operations.

mod admin;
mod content;
mod locale;
mod prayers;
mod settings;
mod uploads;

pub use admin::*;
pub use content::*;
pub use locale::*;
pub use prayers::*;
pub use settings::*;
pub use uploads::*;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ContentKey, Locale};

/// Name of the cookie remembering the visitor's language.
pub const LANG_COOKIE: &str = "lang";

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Optional `?lang=` override of the visitor's language.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

/// Resolve the request locale: `?lang=` first, then the language cookie, then English.
pub fn request_locale(query: &LocaleQuery, headers: &HeaderMap) -> Locale {
    query
        .lang
        .as_deref()
        .and_then(Locale::from_code)
        .or_else(|| cookie_value(headers, LANG_COOKIE).and_then(|v| Locale::from_code(&v)))
        .unwrap_or_default()
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Parse a content key from the URL.
pub fn parse_content_key(raw: &str) -> Result<ContentKey, AppError> {
    ContentKey::from_str(raw)
        .ok_or_else(|| AppError::NotFound(format!("Unknown content '{}'", raw)))
}

/// Parse a content key that must name a list collection.
pub fn parse_list_key(raw: &str) -> Result<ContentKey, AppError> {
    let key = parse_content_key(raw)?;
    if !key.is_list() {
        return Err(AppError::BadRequest(format!("'{}' is not a collection", key)));
    }
    Ok(key)
}

/// Parse a content key that must name a singleton document.
pub fn parse_document_key(raw: &str) -> Result<ContentKey, AppError> {
    let key = parse_content_key(raw)?;
    if key.is_list() {
        return Err(AppError::BadRequest(format!("'{}' is not a document", key)));
    }
    Ok(key)
}
