//! Admin session authentication.
//!
//! A successful login issues a random token kept in process memory; admin routes require it
//! in the `x-session-token` header or as a bearer token.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::errors::{codes, ErrorDetails, ErrorResponse};
use crate::models::AdminSettings;

/// Header name for the session token.
pub const SESSION_HEADER: &str = "x-session-token";

/// Logged-in admin sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and return its token.
    pub async fn create(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }
}

/// Check submitted credentials against the stored admin settings.
///
/// Credentials are compared in plaintext.
pub fn credentials_match(settings: &AdminSettings, username: &str, password: &str) -> bool {
    let user_ok = constant_time_compare(username, &settings.username);
    let pass_ok = constant_time_compare(password, &settings.password);
    user_ok & pass_ok
}

/// Extract the session token from a request's headers.
pub fn session_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.trim().to_string())
}

/// Session authentication layer for admin routes.
pub async fn session_auth_layer(
    sessions: Arc<SessionStore>,
    request: Request,
    next: Next,
) -> Response {
    match session_token(request.headers()) {
        Some(token) if sessions.is_valid(&token).await => next.run(request).await,
        Some(_) => unauthorized_response("Session expired or invalid"),
        None => unauthorized_response("Login required"),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
