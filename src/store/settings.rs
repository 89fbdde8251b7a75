//! Admin settings stored in their own remote document.

use crate::config::Config;
use crate::errors::StoreError;
use crate::models::AdminSettings;

use super::remote::RemoteDocumentClient;

/// Direct get/save of the admin settings document.
///
/// There is no cache and no local copy: when the remote is unconfigured or unreachable,
/// reads yield [`AdminSettings::default`].
pub struct AdminSettingsStore {
    remote: Option<RemoteDocumentClient>,
}

impl AdminSettingsStore {
    pub fn new(remote: Option<RemoteDocumentClient>) -> Self {
        Self { remote }
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let remote = match config.admin_remote() {
            Some(target) => Some(RemoteDocumentClient::new(target, config.http_timeout)?),
            None => None,
        };
        Ok(Self::new(remote))
    }

    /// Current settings, falling back to defaults when the document cannot be read.
    pub async fn get_settings(&self) -> AdminSettings {
        match self.load_settings().await {
            Ok(settings) => settings,
            Err(StoreError::NotConfigured) => AdminSettings::default(),
            Err(err) => {
                tracing::warn!("Admin settings unavailable, using defaults: {}", err);
                AdminSettings::default()
            }
        }
    }

    /// Read the settings document, reporting an unconfigured or unreachable remote.
    ///
    /// A missing or malformed document reads as the defaults.
    pub async fn load_settings(&self) -> Result<AdminSettings, StoreError> {
        let remote = self.remote.as_ref().ok_or(StoreError::NotConfigured)?;

        let record = remote.fetch_record().await?;
        if record.is_null() {
            return Ok(AdminSettings::default());
        }
        Ok(serde_json::from_value(record).unwrap_or_else(|err| {
            tracing::warn!("Admin settings malformed, using defaults: {}", err);
            AdminSettings::default()
        }))
    }

    pub async fn save_settings(&self, settings: &AdminSettings) -> bool {
        let Some(remote) = self.remote.as_ref() else {
            tracing::warn!("Admin settings not saved: remote document not configured");
            return false;
        };

        match remote.replace(settings).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Error saving admin settings: {}", err);
                false
            }
        }
    }
}
