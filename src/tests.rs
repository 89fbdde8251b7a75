//! Integration tests for the church site backend.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use reqwest::{redirect, Client};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::auth::SESSION_HEADER;
use crate::config::{Config, DEFAULT_REMOTE_API_URL};
use crate::test_support::{FakeRemote, FAKE_SECRET};
use crate::{create_router, AppState};

const CONTENT_BIN: &str = "content-bin";
const ADMIN_BIN: &str = "admin-bin";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    state: AppState,
    remote: Option<FakeRemote>,
    temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::build(None).await
    }

    async fn with_remote() -> Self {
        let remote = FakeRemote::start().await;
        remote.seed(CONTENT_BIN, json!({}));
        remote.seed(ADMIN_BIN, json!({"username": "admin", "password": "church123"}));
        Self::build(Some(remote)).await
    }

    async fn build(remote: Option<FakeRemote>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            content_dir: temp_dir.path().join("data"),
            upload_dir: temp_dir.path().join("uploads"),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            cache_ttl: Duration::from_secs(30),
            http_timeout: Duration::from_secs(5),
            remote_api_url: remote
                .as_ref()
                .map(|r| r.base_url().to_string())
                .unwrap_or_else(|| DEFAULT_REMOTE_API_URL.to_string()),
            content_bin_id: remote.as_ref().map(|_| CONTENT_BIN.to_string()),
            admin_bin_id: remote.as_ref().map(|_| ADMIN_BIN.to_string()),
            remote_secret: remote.as_ref().map(|_| FAKE_SECRET.to_string()),
        };

        let state = AppState::from_config(config).expect("Failed to build state");
        let app = create_router(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        TestFixture {
            client,
            base_url,
            state,
            remote,
            temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn content_path(&self, key: &str) -> PathBuf {
        self.temp_dir.path().join("data").join(format!("{}.json", key))
    }

    fn write_content(&self, key: &str, value: Value) {
        std::fs::create_dir_all(self.temp_dir.path().join("data")).unwrap();
        std::fs::write(self.content_path(key), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    async fn login(&self) -> String {
        let resp = self
            .client
            .post(self.url("/api/admin/login"))
            .json(&json!({"username": "admin", "password": "church123"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn admin_get(&self, token: &str, path: &str) -> Value {
        let resp = self
            .client
            .get(self.url(path))
            .header(SESSION_HEADER, token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_requires_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/dashboard"))
        .header(SESSION_HEADER, "not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_login_and_logout() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/login"))
        .json(&json!({"username": "admin", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let token = fixture.login().await;
    let body = fixture.admin_get(&token, "/api/admin/dashboard").await;
    assert_eq!(body["data"]["prayerCount"], 0);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/logout"))
        .header(SESSION_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_login_uses_remote_settings() {
    let fixture = TestFixture::with_remote().await;
    fixture
        .remote
        .as_ref()
        .unwrap()
        .seed(ADMIN_BIN, json!({"username": "pastor", "password": "psalm23"}));

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/login"))
        .json(&json!({"username": "admin", "password": "church123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/login"))
        .json(&json!({"username": "pastor", "password": "psalm23"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_collection_crud_keeps_locales_aligned() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    // Create
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/collections/team"))
        .header(SESSION_HEADER, &token)
        .json(&json!({
            "shared": {"image": "/uploads/team/1.png"},
            "en": {"name": "John", "role": "Pastor"},
            "ta": {"name": "ஜான்", "role": "போதகர்"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_i64().unwrap();

    let body = fixture
        .admin_get(&token, "/api/admin/collections/team")
        .await;
    assert_eq!(
        body["data"]["en"],
        json!([{"id": id, "name": "John", "role": "Pastor", "image": "/uploads/team/1.png"}])
    );
    assert_eq!(
        body["data"]["ta"],
        json!([{"id": id, "name": "ஜான்", "role": "போதகர்", "image": "/uploads/team/1.png"}])
    );

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/collections/team/{}", id)))
        .header(SESSION_HEADER, &token)
        .json(&json!({"en": {"role": "Senior Pastor"}, "ta": {"role": "மூத்த போதகர்"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture
        .admin_get(&token, "/api/admin/collections/team")
        .await;
    assert_eq!(body["data"]["en"][0]["role"], "Senior Pastor");
    assert_eq!(body["data"]["en"][0]["name"], "John");
    assert_eq!(body["data"]["ta"][0]["role"], "மூத்த போதகர்");

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/collections/team/{}", id)))
        .header(SESSION_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture
        .admin_get(&token, "/api/admin/collections/team")
        .await;
    assert_eq!(body["data"]["en"], json!([]));
    assert_eq!(body["data"]["ta"], json!([]));
}

#[tokio::test]
async fn test_update_unknown_id_is_noop() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;
    fixture.write_content("events", json!([{"id": 1, "title": "Easter"}]));

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/collections/events/999"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"en": {"title": "Ghost"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture
        .admin_get(&token, "/api/admin/collections/events")
        .await;
    assert_eq!(body["data"]["en"], json!([{"id": 1, "title": "Easter"}]));
    assert_eq!(body["data"]["ta"], json!([]));
}

#[tokio::test]
async fn test_key_validation() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/collections/about"))
        .header(SESSION_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/documents/events"))
        .header(SESSION_HEADER, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url("/api/content/secrets"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_public_content_is_localized() {
    let fixture = TestFixture::new().await;
    fixture.write_content(
        "services",
        json!([
            {"id": 1, "name": "Sunday Worship", "time": "9:00 AM"},
            {"id": 2, "name": "Bible Study", "time": "7:00 PM"}
        ]),
    );
    fixture.write_content("services_ta", json!([{"id": 1, "name": "ஞாயிறு ஆராதனை"}]));

    let resp = fixture
        .client
        .get(fixture.url("/api/content/services?lang=ta"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"],
        json!([
            {"id": 1, "name": "ஞாயிறு ஆராதனை", "time": "9:00 AM"},
            {"id": 2, "name": "Bible Study", "time": "7:00 PM"}
        ])
    );

    let resp = fixture
        .client
        .get(fixture.url("/api/content/services"))
        .header(header::COOKIE.as_str(), "lang=en")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["name"], "Sunday Worship");

    // Reads never backfill the translation file.
    let stored: Value =
        serde_json::from_slice(&std::fs::read(fixture.content_path("services_ta")).unwrap())
            .unwrap();
    assert_eq!(stored, json!([{"id": 1, "name": "ஞாயிறு ஆராதனை"}]));
}

#[tokio::test]
async fn test_home_and_about_pages() {
    let fixture = TestFixture::new().await;
    fixture.write_content(
        "events",
        json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]),
    );
    fixture.write_content("home", json!({"heroTitle": "Welcome"}));
    fixture.write_content("about", json!({"title": "About Us"}));
    fixture.write_content("team", json!([{"id": 1, "name": "John"}]));

    let body: Value = fixture
        .client
        .get(fixture.url("/api/pages/home"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["home"]["heroTitle"], "Welcome");
    assert_eq!(body["data"]["events"], json!([{"id": 1}, {"id": 2}, {"id": 3}]));

    let body: Value = fixture
        .client
        .get(fixture.url("/api/pages/about"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["about"]["title"], "About Us");
    assert_eq!(body["data"]["team"][0]["name"], "John");
}

#[tokio::test]
async fn test_documents_round_trip() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/documents/contact"))
        .header(SESSION_HEADER, &token)
        .json(&json!({
            "en": {"address": "1 Church Road", "phone": "123"},
            "ta": {"address": "1 சர்ச் சாலை"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture
        .admin_get(&token, "/api/admin/documents/contact")
        .await;
    assert_eq!(body["data"]["ta"], json!({"address": "1 சர்ச் சாலை"}));

    let body: Value = fixture
        .client
        .get(fixture.url("/api/content/contact?lang=ta"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!({"address": "1 சர்ச் சாலை", "phone": "123"}));

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/documents/contact"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"en": [], "ta": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_prayer_wall() {
    let fixture = TestFixture::new().await;

    for (name, confidential) in [("Anna", false), ("Ben", true)] {
        let resp = fixture
            .client
            .post(fixture.url("/api/prayers"))
            .json(&json!({"name": name, "message": "Please pray", "confidential": confidential}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let body: Value = fixture
        .client
        .get(fixture.url("/api/prayers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let wall = body["data"].as_array().unwrap();
    assert_eq!(wall.len(), 1);
    assert_eq!(wall[0]["name"], "Anna");
    assert_eq!(wall[0]["prayedCount"], 0);
    let id = wall[0]["id"].as_i64().unwrap();

    let pray = |action: &'static str| {
        let url = fixture.url(&format!("/api/prayers/{}/pray{}", id, action));
        let client = fixture.client.clone();
        async move { client.post(url).send().await.unwrap() }
    };

    let body: Value = pray("").await.json().await.unwrap();
    assert_eq!(body["data"]["newCount"], 1);
    let body: Value = pray("?action=undo").await.json().await.unwrap();
    assert_eq!(body["data"]["newCount"], 0);
    let body: Value = pray("?action=undo").await.json().await.unwrap();
    assert_eq!(body["data"]["newCount"], 0);

    let resp = fixture
        .client
        .post(fixture.url("/api/prayers/42/pray"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Both locale lists carry the prayers.
    let token = fixture.login().await;
    let body = fixture
        .admin_get(&token, "/api/admin/collections/prayers")
        .await;
    assert_eq!(body["data"]["en"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["ta"].as_array().unwrap().len(), 2);

    let body = fixture.admin_get(&token, "/api/admin/dashboard").await;
    assert_eq!(body["data"]["prayerCount"], 2);
}

#[tokio::test]
async fn test_concurrent_prays_are_all_counted() {
    let fixture = TestFixture::new().await;
    let prayer = json!([{"id": 1, "name": "Anna", "message": "Healing", "prayedCount": 0}]);
    fixture.write_content("prayers", prayer.clone());
    fixture.write_content("prayers_ta", prayer);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = fixture.client.clone();
            let url = fixture.url("/api/prayers/1/pray");
            tokio::spawn(async move { client.post(url).send().await.unwrap().status() })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 200);
    }

    let body: Value = fixture
        .client
        .get(fixture.url("/api/prayers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["prayedCount"], 10);

    let stored: Value =
        serde_json::from_slice(&std::fs::read(fixture.content_path("prayers_ta")).unwrap())
            .unwrap();
    assert_eq!(stored[0]["prayedCount"], 10);
}

#[tokio::test]
async fn test_language_switch() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/lang/ta"))
        .header(header::REFERER.as_str(), "http://site.test/events")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "http://site.test/events");
    let cookie = resp.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("lang=ta"));

    let resp = fixture
        .client
        .get(fixture.url("/lang/ta"))
        .header(header::REFERER.as_str(), "http://site.test/lang/en")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/");

    let resp = fixture
        .client
        .get(fixture.url("/lang/fr"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/");
    assert!(resp.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_writes_reach_remote_document() {
    let fixture = TestFixture::with_remote().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/collections/gallery"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"shared": {"url": "/uploads/gallery/a.png"}, "en": {"caption": "Choir"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let document = fixture
        .remote
        .as_ref()
        .unwrap()
        .document(CONTENT_BIN)
        .unwrap();
    assert_eq!(document["gallery"][0]["caption"], "Choir");
    assert_eq!(document["gallery_ta"][0]["url"], "/uploads/gallery/a.png");
    assert_eq!(document["gallery"][0]["id"], document["gallery_ta"][0]["id"]);
    assert!(fixture.content_path("gallery").exists());
}

#[tokio::test]
async fn test_remote_write_failure_is_reported() {
    let fixture = TestFixture::with_remote().await;
    let token = fixture.login().await;
    fixture.remote.as_ref().unwrap().set_failing(true);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/collections/events"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"en": {"title": "Harvest Festival"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "STORAGE_ERROR");

    // The local copy still has it.
    let body: Value = fixture
        .client
        .get(fixture.url("/api/content/events"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["title"], "Harvest Festival");
}

#[tokio::test]
async fn test_settings_update() {
    let fixture = TestFixture::with_remote().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .header(SESSION_HEADER, &token)
        .json(&json!({
            "username": "admin",
            "password": "church123",
            "liveStreamEnabled": true,
            "liveStreamTitle": "Sunday Service"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture.admin_get(&token, "/api/admin/settings").await;
    assert_eq!(body["data"]["liveStreamEnabled"], true);
    assert_eq!(body["data"]["liveStreamTitle"], "Sunday Service");
}

#[tokio::test]
async fn test_partial_settings_update_keeps_credentials() {
    let fixture = TestFixture::with_remote().await;
    let remote = fixture.remote.as_ref().unwrap();
    remote.seed(ADMIN_BIN, json!({"username": "pastor", "password": "psalm23"}));

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/login"))
        .json(&json!({"username": "pastor", "password": "psalm23"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"liveStreamEnabled": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(
        remote.document(ADMIN_BIN).unwrap(),
        json!({"username": "pastor", "password": "psalm23", "liveStreamEnabled": true})
    );

    // Unreadable settings are never replaced with the defaults.
    remote.set_failing(true);
    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"liveStreamEnabled": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    remote.set_failing(false);
    assert_eq!(remote.document(ADMIN_BIN).unwrap()["username"], "pastor");
}

#[tokio::test]
async fn test_settings_update_without_remote_fails() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/admin/settings"))
        .header(SESSION_HEADER, &token)
        .json(&json!({"username": "admin", "password": "changed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);

    let body = fixture.admin_get(&token, "/api/admin/settings").await;
    assert_eq!(body["data"]["password"], "church123");
}

#[tokio::test]
async fn test_upload_stores_file_under_category() {
    let fixture = TestFixture::new().await;
    let token = fixture.state.sessions.create().await;
    let app = create_router(fixture.state.clone());

    let upload = |category: &str| {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"choir.PNG\"\r\n\
             Content-Type: image/png\r\n\r\nfake-png-bytes\r\n--{b}--\r\n",
            b = boundary
        );
        Request::builder()
            .method("POST")
            .uri(format!("/api/admin/uploads/{}", category))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .header(SESSION_HEADER, &token)
            .body(Body::from(body))
            .unwrap()
    };
    let request = upload("gallery");

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let path = body["data"]["path"].as_str().unwrap();
    assert!(path.starts_with("/uploads/gallery/"));
    assert!(path.ends_with(".png"));

    let stored = fixture
        .temp_dir
        .path()
        .join("uploads")
        .join(path.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"fake-png-bytes");

    let request = upload("secrets");
    let response = create_router(fixture.state.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
