//! Admin settings model.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "church123";

/// Admin credentials and site flags, kept in their own remote document.
///
/// Fields missing from the stored document take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
    pub live_stream_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_stream_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_stream_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_stream_link: Option<String>,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            live_stream_enabled: false,
            live_stream_title: None,
            live_stream_text: None,
            live_stream_link: None,
        }
    }
}
