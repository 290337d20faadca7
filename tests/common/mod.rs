#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use osstracker_console::background::connection_bootstrap::Bootstrapper;
use osstracker_console::config::{AppConfig, StoreBackend};
use osstracker_console::routes::build_router;
use osstracker_console::state::{AppState, Backends};
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn test_config(store_dir: &str, index_port: u16) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_level: "error".to_string(),
        store_backend: StoreBackend::Sqlite,
        store_hosts: vec![],
        store_port: 7104,
        store_dir: store_dir.to_string(),
        index_hosts: vec!["127.0.0.1".to_string()],
        index_port,
        bootstrap_interval_secs: 1,
        store_timeout_secs: 5,
        index_timeout_secs: 5,
        directory_url: None,
        max_body_size: 65_536,
    }
}

pub async fn spawn_server(app: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake server");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// A port nothing is listening on.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

// ==================== Fake search index ====================

#[derive(Default)]
struct FakeIndexInner {
    docs: Vec<Value>,
    fail_status: Option<StatusCode>,
    delay: Option<Duration>,
    queries: Vec<Value>,
}

/// Serves `_search` over stored documents, honouring `size` and a descending
/// sort on `asOfYYYYMMDD`.
#[derive(Clone, Default)]
pub struct FakeIndex {
    inner: Arc<Mutex<FakeIndexInner>>,
}

impl FakeIndex {
    pub async fn spawn() -> (Self, u16) {
        let index = FakeIndex::default();
        let app = Router::new()
            .route("/", get(index_root))
            .route("/osstracker/allrepos_stats/_search", post(index_search))
            .with_state(index.clone());
        let port = spawn_server(app).await;
        (index, port)
    }

    pub fn push_doc(&self, doc: Value) {
        self.inner.lock().unwrap().docs.push(doc);
    }

    pub fn fail_with(&self, status: StatusCode) {
        self.inner.lock().unwrap().fail_status = Some(status);
    }

    /// Holds every search response back for `delay`.
    pub fn delay_for(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    pub fn queries(&self) -> Vec<Value> {
        self.inner.lock().unwrap().queries.clone()
    }
}

async fn index_root() -> Json<Value> {
    Json(json!({ "tagline": "You Know, for Search" }))
}

async fn index_search(State(index): State<FakeIndex>, Json(query): Json<Value>) -> Response {
    let delay = index.inner.lock().unwrap().delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut inner = index.inner.lock().unwrap();
    inner.queries.push(query.clone());

    if let Some(status) = inner.fail_status {
        return (status, "index failure").into_response();
    }

    let size = query["size"].as_u64().unwrap_or(10) as usize;
    let mut docs = inner.docs.clone();
    docs.sort_by(|a, b| {
        b["asOfYYYYMMDD"]
            .as_str()
            .unwrap_or_default()
            .cmp(a["asOfYYYYMMDD"].as_str().unwrap_or_default())
    });
    let hits: Vec<Value> = docs
        .into_iter()
        .take(size)
        .map(|doc| json!({ "_index": "osstracker", "_type": "allrepos_stats", "_source": doc }))
        .collect();

    Json(json!({ "hits": { "total": hits.len(), "hits": hits } })).into_response()
}

// ==================== Fixtures ====================

pub fn repo_entry(name: &str, forks: u64, stars: u64) -> Value {
    json!({
        "asOfISO": "2016-02-09T08:18:44Z",
        "asOfYYYYMMDD": "2016-02-09",
        "repo_name": name,
        "public": true,
        "osslifecycle": "active",
        "forks": forks,
        "stars": stars,
        "numContributors": 2,
        "issues": { "openCount": 1, "closedCount": 2, "avgTimeToCloseInDays": 3 },
        "pullRequests": { "openCount": 0, "closedCount": 1, "avgTimeToCloseInDays": 1 },
        "commits": { "daysSinceLastCommit": 4 },
        "contributors": ["someone"]
    })
}

pub fn snapshot_doc(date: &str, repos: Vec<Value>) -> Value {
    json!({
        "asOfISO": format!("{}T08:18:44Z", date),
        "asOfYYYYMMDD": date,
        "avgForks": 134,
        "avgStars": 599,
        "issues": { "avgOpenCount": 39, "avgClosedCount": 210, "totalOpenCount": 356, "totalClosedCount": 1897 },
        "pullRequests": { "avgOpenCount": 8, "avgClosedCount": 154, "totalOpenCount": 73, "totalClosedCount": 1389 },
        "commits": {},
        "repos": repos
    })
}

// ==================== App setup ====================

pub struct TestEnv {
    pub state: AppState,
    pub index: FakeIndex,
    pub config: AppConfig,
    pub _tmp: tempfile::TempDir,
}

/// Fully bootstrapped app backed by a temp store and a fake index.
pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

/// Like `setup`, with `adjust` applied to the config before bootstrapping.
pub async fn setup_with(adjust: impl FnOnce(&mut AppConfig)) -> TestEnv {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let (index, port) = FakeIndex::spawn().await;
    let mut config = test_config(tmp.path().to_str().unwrap(), port);
    adjust(&mut config);

    let backends = Backends::new();
    let bootstrapper = Bootstrapper::new(config.clone(), backends.clone());
    assert!(bootstrapper.try_connect_once().await, "bootstrap failed");

    let state = AppState::new(config.clone(), backends);
    TestEnv {
        state,
        index,
        config,
        _tmp: tmp,
    }
}

pub fn seed_org(config: &AppConfig, short: &str, description: &str) {
    let conn = rusqlite::Connection::open(config.store_path()).unwrap();
    conn.execute(
        "INSERT INTO repo_orgs (org_short, org_description) VALUES (?1, ?2)",
        rusqlite::params![short, description],
    )
    .unwrap();
}

// ==================== Request helpers ====================

pub async fn body_to_bytes(body: Body) -> Bytes {
    body.collect().await.unwrap().to_bytes()
}

pub async fn body_to_json(body: Body) -> Value {
    let bytes = body_to_bytes(body).await;
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(state: &AppState, req: Request<Body>) -> Response {
    build_router(state.clone()).oneshot(req).await.unwrap()
}

pub async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = send(state, req).await;
    let status = resp.status();
    (status, body_to_json(resp.into_body()).await)
}

pub async fn post_json(state: &AppState, uri: &str, body: Value) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(state, req).await
}
