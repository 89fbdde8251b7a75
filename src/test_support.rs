//! In-process stand-in for the remote JSON document API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::RemoteTarget;
use crate::store::MASTER_KEY_HEADER;

pub const FAKE_SECRET: &str = "test-master-key";

#[derive(Default)]
struct FakeState {
    documents: Mutex<HashMap<String, Value>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    failing: AtomicBool,
    next_get_delay: Mutex<Option<Duration>>,
}

/// Fake document API listening on a random local port.
pub struct FakeRemote {
    base_url: String,
    state: Arc<FakeState>,
}

impl FakeRemote {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/b/{id}/latest", get(read_document))
            .route("/b/{id}", put(replace_document))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake remote");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/b", addr),
            state,
        }
    }

    pub fn target(&self, document_id: &str) -> RemoteTarget {
        RemoteTarget {
            base_url: self.base_url.clone(),
            document_id: document_id.to_string(),
            secret: FAKE_SECRET.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn seed(&self, document_id: &str, document: Value) {
        self.state
            .documents
            .lock()
            .unwrap()
            .insert(document_id.to_string(), document);
    }

    pub fn document(&self, document_id: &str) -> Option<Value> {
        self.state.documents.lock().unwrap().get(document_id).cloned()
    }

    /// Make every request answer 503 until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold the next GET response for `delay`. The document is read before the wait.
    pub fn delay_next_get(&self, delay: Duration) {
        *self.state.next_get_delay.lock().unwrap() = Some(delay);
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.state.puts.load(Ordering::SeqCst)
    }
}

fn check_request(state: &FakeState, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    if state.failing.load(Ordering::SeqCst) {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "unavailable"})),
        ));
    }
    let authorized = headers
        .get(MASTER_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == FAKE_SECRET);
    if !authorized {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid master key"})),
        ));
    }
    Ok(())
}

async fn read_document(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.gets.fetch_add(1, Ordering::SeqCst);
    check_request(&state, &headers)?;

    let document = state.documents.lock().unwrap().get(&id).cloned();
    let delay = state.next_get_delay.lock().unwrap().take();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match document {
        Some(record) => Ok(Json(json!({"record": record, "metadata": {"id": id}}))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "bin not found"})),
        )),
    }
}

async fn replace_document(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.puts.fetch_add(1, Ordering::SeqCst);
    check_request(&state, &headers)?;

    state
        .documents
        .lock()
        .unwrap()
        .insert(id.clone(), body.clone());
    Ok(Json(json!({"record": body, "metadata": {"parentId": id}})))
}
