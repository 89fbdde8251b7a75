//! Language switch.

use axum::{
    extract::Path,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};

use super::LANG_COOKIE;
use crate::models::Locale;

/// GET /lang/:locale - Remember the language in a cookie and go back where the visitor was.
pub async fn switch_language(Path(locale): Path<String>, headers: HeaderMap) -> Response {
    let Some(locale) = Locale::from_code(&locale) else {
        return Redirect::to("/").into_response();
    };

    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|referer| !referer.contains("/lang/"))
        .unwrap_or("/")
        .to_string();

    let cookie = format!("{}={}; Path=/; SameSite=Lax", LANG_COOKIE, locale.code());
    ([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response()
}
