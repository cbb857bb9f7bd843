//! In-process mock of the collaboration API for tests.
//!
//! Binds an axum server to an ephemeral port and exposes knobs for the
//! fixtures tests care about: the stored document, the shareable flag, the
//! subscription index, per-route request counters, injected failures, and
//! artificial latency.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use vellum_api::{ApiClient, ApiConfig, Timings};
use vellum_shared::{Document, Project, UserProfile};

use crate::events::{FlashMessage, UiEvent};

/// Honor `RUST_LOG` in test output. Safe to call repeatedly.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Collect every flash already sitting on the event channel.
pub fn drain_flashes(mut rx: UnboundedReceiver<UiEvent>) -> Vec<FlashMessage> {
    let mut flashes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let UiEvent::Flash(flash) = event {
            flashes.push(flash);
        }
    }
    flashes
}

#[derive(Debug)]
struct MockState {
    profile: UserProfile,
    subscriptions: Mutex<Option<Vec<String>>>,
    shareable: Mutex<bool>,
    document: Mutex<Option<Document>>,
    last_patch: Mutex<Map<String, Value>>,
    projects: Mutex<Vec<Project>>,
    /// After this many GETs of the document, report this doc number
    /// instead of the stored (provisional) one.
    resolve_doc_number: Mutex<Option<(usize, String)>>,
    counters: Mutex<HashMap<String, usize>>,
    failures: Mutex<HashSet<String>>,
    delay: Mutex<Duration>,
}

impl MockState {
    /// Count the request, apply artificial latency, and short-circuit with
    /// a 500 when a failure is injected for this route.
    async fn intercept(&self, key: &str) -> Option<Response> {
        *self.counters.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(key) {
            return Some(
                (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response(),
            );
        }
        None
    }
}

/// Handle to a running mock API server.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        init_tracing();
        let state = Arc::new(MockState {
            profile: UserProfile {
                email: "user@example.com".into(),
                name: "Test User".into(),
                given_name: "Test".into(),
                picture: String::new(),
            },
            subscriptions: Mutex::new(None),
            shareable: Mutex::new(false),
            document: Mutex::new(None),
            last_patch: Mutex::new(Map::new()),
            projects: Mutex::new(Vec::new()),
            resolve_doc_number: Mutex::new(None),
            counters: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
            delay: Mutex::new(Duration::ZERO),
        });

        let router = Router::new()
            .route("/api/:v/me", get(get_me))
            .route(
                "/api/:v/me/subscriptions",
                get(get_subscriptions).post(post_subscriptions),
            )
            .route(
                "/api/:v/drafts/:id/shareable",
                get(get_shareable).put(put_shareable),
            )
            .route("/api/:v/drafts/:id", patch(patch_doc).delete(delete_draft))
            .route(
                "/api/:v/documents/:id",
                get(get_document).patch(patch_published_doc),
            )
            .route("/api/:v/reviews/:id", post(post_review))
            .route(
                "/api/:v/approvals/:id",
                post(post_approval).delete(delete_approval),
            )
            .route("/api/:v/projects", post(post_project))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// An [`ApiClient`] pointed at this server, with instant timings.
    pub fn client(&self) -> ApiClient {
        let config = ApiConfig {
            base_url: format!("http://{}", self.addr),
            api_version: "v1".to_string(),
            short_link_base_url: None,
            timings: Timings::instant(),
        };
        ApiClient::new(config)
    }

    /// How many requests hit a route, keyed like `"PATCH /drafts/{id}"`.
    pub fn requests(&self, key: &str) -> usize {
        self.state
            .counters
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Make one route answer 500 from now on.
    pub fn fail(&self, key: &str) {
        self.state.failures.lock().unwrap().insert(key.to_string());
    }

    /// Delay every response by `delay`, to widen race windows.
    pub fn delay_responses(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn seed_subscriptions(&self, areas: &[&str]) {
        *self.state.subscriptions.lock().unwrap() =
            Some(areas.iter().map(|s| s.to_string()).collect());
    }

    /// Make `GET /me/subscriptions` answer `null`.
    pub fn clear_subscriptions(&self) {
        *self.state.subscriptions.lock().unwrap() = None;
    }

    /// The server-side subscription index, as last POSTed.
    pub fn subscription_index(&self) -> Vec<String> {
        self.state
            .subscriptions
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default()
    }

    pub fn set_document(&self, document: Document) {
        *self.state.document.lock().unwrap() = Some(document);
    }

    pub fn set_shareable(&self, shareable: bool) {
        *self.state.shareable.lock().unwrap() = shareable;
    }

    pub fn shareable(&self) -> bool {
        *self.state.shareable.lock().unwrap()
    }

    /// The value of `field` in the most recent PATCH body.
    pub fn patched_field(&self, field: &str) -> Option<Value> {
        self.state.last_patch.lock().unwrap().get(field).cloned()
    }

    /// Report `doc_number` from the `attempt`-th document GET onward.
    pub fn resolve_doc_number_after(&self, attempt: usize, doc_number: &str) {
        *self.state.resolve_doc_number.lock().unwrap() =
            Some((attempt, doc_number.to_string()));
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.projects.lock().unwrap().clone()
    }
}

async fn get_me(State(state): State<Arc<MockState>>, Path(_v): Path<String>) -> Response {
    if let Some(resp) = state.intercept("GET /me").await {
        return resp;
    }
    Json(state.profile.clone()).into_response()
}

async fn get_subscriptions(
    State(state): State<Arc<MockState>>,
    Path(_v): Path<String>,
) -> Response {
    if let Some(resp) = state.intercept("GET /me/subscriptions").await {
        return resp;
    }
    Json(state.subscriptions.lock().unwrap().clone()).into_response()
}

async fn post_subscriptions(
    State(state): State<Arc<MockState>>,
    Path(_v): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = state.intercept("POST /me/subscriptions").await {
        return resp;
    }
    let areas: Vec<String> = body["subscriptions"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    *state.subscriptions.lock().unwrap() = Some(areas);
    StatusCode::OK.into_response()
}

async fn get_shareable(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("GET /drafts/{id}/shareable").await {
        return resp;
    }
    let shareable = *state.shareable.lock().unwrap();
    Json(serde_json::json!({ "isShareable": shareable })).into_response()
}

async fn put_shareable(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = state.intercept("PUT /drafts/{id}/shareable").await {
        return resp;
    }
    *state.shareable.lock().unwrap() = body["isShareable"].as_bool().unwrap_or(false);
    StatusCode::OK.into_response()
}

async fn patch_doc(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if let Some(resp) = state.intercept("PATCH /drafts/{id}").await {
        return resp;
    }
    *state.last_patch.lock().unwrap() = body;
    StatusCode::OK.into_response()
}

async fn patch_published_doc(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if let Some(resp) = state.intercept("PATCH /documents/{id}").await {
        return resp;
    }
    *state.last_patch.lock().unwrap() = body;
    StatusCode::OK.into_response()
}

async fn delete_draft(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("DELETE /drafts/{id}").await {
        return resp;
    }
    StatusCode::OK.into_response()
}

async fn get_document(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("GET /documents/{id}").await {
        return resp;
    }
    let Some(mut document) = state.document.lock().unwrap().clone() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let gets = state
        .counters
        .lock()
        .unwrap()
        .get("GET /documents/{id}")
        .copied()
        .unwrap_or(0);
    if let Some((attempt, number)) = state.resolve_doc_number.lock().unwrap().clone() {
        if gets >= attempt {
            document.doc_number = number;
        }
    }
    Json(document).into_response()
}

async fn post_review(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("POST /reviews/{id}").await {
        return resp;
    }
    StatusCode::OK.into_response()
}

async fn post_approval(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("POST /approvals/{id}").await {
        return resp;
    }
    StatusCode::OK.into_response()
}

async fn delete_approval(
    State(state): State<Arc<MockState>>,
    Path((_v, _id)): Path<(String, String)>,
) -> Response {
    if let Some(resp) = state.intercept("DELETE /approvals/{id}").await {
        return resp;
    }
    StatusCode::OK.into_response()
}

async fn post_project(
    State(state): State<Arc<MockState>>,
    Path(_v): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(resp) = state.intercept("POST /projects").await {
        return resp;
    }
    let mut projects = state.projects.lock().unwrap();
    let project = Project {
        id: projects.len() as u64 + 1,
        title: body["title"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().map(String::from),
    };
    projects.push(project.clone());
    Json(project).into_response()
}
