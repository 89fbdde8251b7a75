//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AdminSettings, Record};

/// Body for creating or updating a record in a bilingual collection.
///
/// `shared` holds locale-independent fields (image path, date, links) and is copied into both
/// records; `en` and `ta` hold the per-locale text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedRecordRequest {
    #[serde(default)]
    pub shared: Record,
    #[serde(default)]
    pub en: Record,
    #[serde(default)]
    pub ta: Record,
}

/// Both locale variants of a list collection or singleton document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedContent {
    pub en: Value,
    pub ta: Value,
}

/// Response after creating a record.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRecord {
    pub id: i64,
}

/// Body of a public prayer request submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrayerRequest {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub confidential: bool,
}

/// Query string of the pray endpoint: `?action=undo` takes a prayer back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrayQuery {
    #[serde(default)]
    pub action: Option<String>,
}

/// Response of the pray endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayedCount {
    pub new_count: i64,
}

/// Admin login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of an admin settings update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub live_stream_enabled: Option<bool>,
    /// An empty string clears the stored value.
    pub live_stream_title: Option<String>,
    pub live_stream_text: Option<String>,
    pub live_stream_link: Option<String>,
}

impl UpdateSettingsRequest {
    /// Overlay the fields present in the request onto `settings`.
    pub fn apply_to(self, settings: &mut AdminSettings) {
        if let Some(username) = self.username {
            settings.username = username;
        }
        if let Some(password) = self.password {
            settings.password = password;
        }
        if let Some(enabled) = self.live_stream_enabled {
            settings.live_stream_enabled = enabled;
        }

        let replace = |slot: &mut Option<String>, value: Option<String>| {
            if let Some(value) = value {
                *slot = Some(value).filter(|v| !v.is_empty());
            }
        };
        replace(&mut settings.live_stream_title, self.live_stream_title);
        replace(&mut settings.live_stream_text, self.live_stream_text);
        replace(&mut settings.live_stream_link, self.live_stream_link);
    }
}

/// Record counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub prayer_count: usize,
    pub event_count: usize,
    pub sermon_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_settings_update_keeps_credentials() {
        let mut settings = AdminSettings {
            username: "pastor".to_string(),
            password: "psalm23".to_string(),
            live_stream_title: Some("Sunday".to_string()),
            ..AdminSettings::default()
        };

        let request: UpdateSettingsRequest =
            serde_json::from_value(json!({"liveStreamEnabled": true, "liveStreamTitle": ""}))
                .unwrap();
        request.apply_to(&mut settings);

        assert_eq!(settings.username, "pastor");
        assert_eq!(settings.password, "psalm23");
        assert!(settings.live_stream_enabled);
        assert_eq!(settings.live_stream_title, None);
    }
}
