//! Church Site Backend
//!
//! Bilingual (English/Tamil) website content API with an admin panel, backed by local JSON
//! files and an optional remote JSON document store.

mod api;
mod auth;
mod config;
mod errors;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionStore;
use config::Config;
use models::IdGenerator;
use store::{AdminSettingsStore, LocalePairSync, TieredStore};

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TieredStore>,
    pub sync: Arc<LocalePairSync>,
    pub settings: Arc<AdminSettingsStore>,
    pub sessions: Arc<SessionStore>,
    pub ids: Arc<IdGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up the stores described by `config`.
    pub fn from_config(config: Config) -> Result<Self, errors::StoreError> {
        let store = Arc::new(TieredStore::from_config(&config)?);
        Ok(Self {
            sync: Arc::new(LocalePairSync::new(store.clone())),
            settings: Arc::new(AdminSettingsStore::from_config(&config)?),
            sessions: Arc::new(SessionStore::new()),
            ids: Arc::new(IdGenerator::new()),
            store,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Church Site Backend");
    tracing::info!("Content directory: {:?}", config.content_dir);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_remote().is_none() {
        tracing::warn!(
            "Admin settings store not configured (JSONBIN_ADMIN_ID). Default admin credentials are active!"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config)?;
    if !state.store.remote_configured() {
        tracing::warn!(
            "Remote content store not configured (JSONBIN_BIN_ID/JSONBIN_SECRET). Using local files only."
        );
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sessions = state.sessions.clone();

    // Admin routes (session required, except login which is added after the layer)
    let admin_routes = Router::new()
        .route("/logout", post(api::logout))
        .route("/dashboard", get(api::dashboard))
        // Bilingual collections
        .route(
            "/collections/{key}",
            get(api::list_collection).post(api::create_record),
        )
        .route(
            "/collections/{key}/{id}",
            put(api::update_record).delete(api::delete_record),
        )
        // Singleton documents
        .route(
            "/documents/{key}",
            get(api::get_document).put(api::save_document),
        )
        // Settings
        .route(
            "/settings",
            get(api::get_settings).put(api::update_settings),
        )
        // Uploads
        .route(
            "/uploads/{category}",
            post(api::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(sessions.clone(), req, next)
        }))
        .route("/login", post(api::login));

    // Public API routes
    let api_routes = Router::new()
        .route("/content/{key}", get(api::get_content))
        .route("/pages/home", get(api::home_page))
        .route("/pages/about", get(api::about_page))
        .route("/prayers", get(api::list_prayers).post(api::submit_prayer))
        .route("/prayers/{id}/pray", post(api::pray))
        .nest("/admin", admin_routes);

    // Health check and language switch (no auth required)
    let site_routes = Router::new()
        .route("/health", get(health_check))
        .route("/lang/{locale}", get(api::switch_language));

    Router::new()
        .nest("/api", api_routes)
        .merge(site_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests;
