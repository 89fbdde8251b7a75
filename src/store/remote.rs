//! Client for the remote JSON document API.
//!
//! The API stores one JSON document per id. `GET {base}/{id}/latest` answers
//! `{"record": <document>}`, `PUT {base}/{id}` replaces the whole document.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RemoteTarget;
use crate::errors::StoreError;

/// Header carrying the static API secret.
pub const MASTER_KEY_HEADER: &str = "X-Master-Key";

const MAX_LOG_BODY_CHARS: usize = 512;

/// The remote content document: content key to content value.
pub type Document = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    record: Option<Value>,
}

/// HTTP client bound to one remote document.
#[derive(Debug, Clone)]
pub struct RemoteDocumentClient {
    client: reqwest::Client,
    target: RemoteTarget,
}

impl RemoteDocumentClient {
    pub fn new(target: RemoteTarget, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, target })
    }

    fn latest_url(&self) -> String {
        format!("{}/{}/latest", self.target.base_url, self.target.document_id)
    }

    fn document_url(&self) -> String {
        format!("{}/{}", self.target.base_url, self.target.document_id)
    }

    /// Fetch the raw record stored in the document.
    pub async fn fetch_record(&self) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.latest_url())
            .header(MASTER_KEY_HEADER, &self.target.secret)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log_response(&self.target.document_id, status, &body);
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let envelope: RecordEnvelope = serde_json::from_str(&body)?;
        envelope
            .record
            .ok_or_else(|| StoreError::Shape("response carries no record".to_string()))
    }

    /// Fetch the record and require it to be a key/value document.
    pub async fn fetch_document(&self) -> Result<Document, StoreError> {
        match self.fetch_record().await? {
            Value::Object(document) => Ok(document),
            other => Err(StoreError::Shape(format!(
                "remote record is not an object: {}",
                preview(&other.to_string())
            ))),
        }
    }

    /// Replace the whole remote document with `body`.
    pub async fn replace<T: Serialize + ?Sized>(&self, body: &T) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url())
            .header(MASTER_KEY_HEADER, &self.target.secret)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        log_response(&self.target.document_id, status, &text);
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: preview(&text),
            });
        }
        Ok(())
    }
}

fn preview(body: &str) -> String {
    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    preview
}

fn log_response(document_id: &str, status: reqwest::StatusCode, body: &str) {
    if status.is_success() {
        tracing::debug!("Remote document {} responded {}", document_id, status);
    } else {
        tracing::debug!(
            "Remote document {} responded {}: {}",
            document_id,
            status,
            preview(body)
        );
    }
}
