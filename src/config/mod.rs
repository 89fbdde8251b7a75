//! Configuration module for the church site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the remote document API.
pub const DEFAULT_REMOTE_API_URL: &str = "https://api.jsonbin.io/v3/b";

/// One remote document: where it lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub base_url: String,
    pub document_id: String,
    pub secret: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON file per content key
    pub content_dir: PathBuf,
    /// Root directory for uploaded media
    pub upload_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// How long a fetched remote document stays fresh
    pub cache_ttl: Duration,
    /// Timeout applied to every remote request
    pub http_timeout: Duration,
    /// Base URL of the remote document API
    pub remote_api_url: String,
    /// Remote document holding site content
    pub content_bin_id: Option<String>,
    /// Remote document holding admin settings
    pub admin_bin_id: Option<String>,
    /// Secret sent with every remote request
    pub remote_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let content_dir = env::var("CHURCH_CONTENT_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let upload_dir = env::var("CHURCH_UPLOAD_DIR")
            .unwrap_or_else(|_| "./public/uploads".to_string())
            .into();

        let bind_addr = env::var("CHURCH_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .expect("Invalid CHURCH_BIND_ADDR format");

        let log_level = env::var("CHURCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cache_ttl = Duration::from_secs(secs_from_env("CHURCH_CACHE_TTL_SECS", 30));
        let http_timeout = Duration::from_secs(secs_from_env("CHURCH_HTTP_TIMEOUT_SECS", 10));

        let remote_api_url =
            env::var("JSONBIN_API_URL").unwrap_or_else(|_| DEFAULT_REMOTE_API_URL.to_string());

        Self {
            content_dir,
            upload_dir,
            bind_addr,
            log_level,
            cache_ttl,
            http_timeout,
            remote_api_url,
            content_bin_id: non_empty_var("JSONBIN_BIN_ID"),
            admin_bin_id: non_empty_var("JSONBIN_ADMIN_ID"),
            remote_secret: non_empty_var("JSONBIN_SECRET"),
        }
    }

    /// The content document, if both its id and the secret are configured.
    pub fn content_remote(&self) -> Option<RemoteTarget> {
        self.remote_target(self.content_bin_id.as_deref())
    }

    /// The admin settings document, if both its id and the secret are configured.
    pub fn admin_remote(&self) -> Option<RemoteTarget> {
        self.remote_target(self.admin_bin_id.as_deref())
    }

    fn remote_target(&self, document_id: Option<&str>) -> Option<RemoteTarget> {
        let document_id = document_id?;
        let secret = self.remote_secret.as_deref()?;
        Some(RemoteTarget {
            base_url: self.remote_api_url.trim_end_matches('/').to_string(),
            document_id: document_id.to_string(),
            secret: secret.to_string(),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn secs_from_env(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}s", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
