// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake of the directory service and the identity provider.

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Form, Json, Router,
};
use coach_console::config::Config;
use coach_console::models::session::SessionDate;
use coach_console::models::{AthleteId, AthleteRecord, SessionId, TrainingSession};
use coach_console::services::{ApiClient, AuthSession, Credentials, KeycloakProvider};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";
pub const REALM: &str = "trainer-app";
pub const USERNAME: &str = "coach";
pub const PASSWORD: &str = "secret";

/// A request seen by the fake directory service.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Shared state of the fake backend.
pub struct FakeState {
    pub athletes: Mutex<Vec<AthleteRecord>>,
    /// Sessions keyed by athlete ID
    pub sessions: Mutex<HashMap<AthleteId, Vec<TrainingSession>>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
    /// Delays applied to successive `GET /trainer/clients` calls
    pub list_delays_ms: Mutex<VecDeque<u64>>,
    /// When set, `GET /trainer/clients` answers with this status
    pub list_failure: Mutex<Option<u16>>,
    pub refresh_ok: AtomicBool,
    pub token_lifetime_secs: AtomicI64,
    pub logins: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub logouts: AtomicUsize,
    next_id: AtomicU64,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            athletes: Mutex::new(Vec::new()),
            sessions: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            list_delays_ms: Mutex::new(VecDeque::new()),
            list_failure: Mutex::new(None),
            refresh_ok: AtomicBool::new(true),
            token_lifetime_secs: AtomicI64::new(300),
            logins: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        }
    }
}

#[allow(dead_code)]
impl FakeState {
    fn assign_id(&self) -> AthleteId {
        AthleteId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    pub fn seed_athlete(&self, name: &str, goal: Option<&str>) -> AthleteRecord {
        let record = AthleteRecord {
            id: self.assign_id(),
            name: name.to_string(),
            goal: goal.map(str::to_string),
            profile: None,
        };
        self.athletes.lock().unwrap().push(record.clone());
        record
    }

    pub fn seed_session(&self, athlete_id: &AthleteId, session_id: &str, day: &str) {
        let session = TrainingSession {
            id: SessionId::new(session_id),
            date: SessionDate::Day(day.parse().expect("valid date")),
            feedback: None,
            performance_rating: None,
        };
        self.sessions
            .lock()
            .unwrap()
            .entry(athlete_id.clone())
            .or_default()
            .push(session);
    }

    /// Requests that reached the directory service (identity calls excluded).
    pub fn directory_requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with("/trainer"))
            .cloned()
            .collect()
    }
}

pub struct TestServer {
    pub url: String,
    pub state: Arc<FakeState>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn config(&self) -> Config {
        Config {
            api_base_url: self.url.clone(),
            auth_url: self.url.clone(),
            auth_realm: REALM.to_string(),
            ..Config::default()
        }
    }
}

/// Start the fake on an ephemeral port.
pub async fn spawn_server() -> TestServer {
    let state = Arc::new(FakeState::default());
    let oidc = format!("/realms/{}/protocol/openid-connect", REALM);

    let app = Router::new()
        .route("/trainer/clients", get(list_clients).post(create_client))
        .route(
            "/trainer/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route("/trainer/clients/{id}/sessions", get(list_sessions))
        .route("/trainer/sessions/{id}/feedback", patch(update_feedback))
        .route(&format!("{}/token", oidc), post(token))
        .route(&format!("{}/logout", oidc), post(logout))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server crashed");
    });

    TestServer {
        url: format!("http://{}", addr),
        state,
    }
}

#[allow(dead_code)]
pub fn credentials() -> Credentials {
    Credentials {
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
    }
}

/// Session backed by the fake identity provider, not yet logged in.
#[allow(dead_code)]
pub fn session(server: &TestServer) -> Arc<AuthSession> {
    let provider = KeycloakProvider::new(&server.config(), credentials())
        .expect("Failed to build provider");
    Arc::new(AuthSession::new(Arc::new(provider)))
}

/// Logged-in API client.
#[allow(dead_code)]
pub async fn logged_in_client(server: &TestServer) -> ApiClient {
    let session = session(server);
    assert!(session.init().await.expect("login should reach provider"));
    ApiClient::new(&server.config(), session).expect("Failed to build client")
}

// ─── Middleware ──────────────────────────────────────────────────────────────

async fn record_request(State(state): State<Arc<FakeState>>, req: Request, next: Next) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    next.run(req).await
}

// ─── Directory handlers ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ClientBody {
    name: String,
    goal: Option<String>,
    profile: Option<String>,
}

#[derive(Deserialize)]
struct FeedbackBody {
    feedback: String,
    performance_rating: u8,
}

async fn list_clients(State(state): State<Arc<FakeState>>) -> Response {
    let snapshot = state.athletes.lock().unwrap().clone();
    let delay = state.list_delays_ms.lock().unwrap().pop_front();
    if let Some(ms) = delay {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
    let failure = *state.list_failure.lock().unwrap();
    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "directory down").into_response();
    }
    Json(snapshot).into_response()
}

async fn create_client(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<ClientBody>,
) -> Json<AthleteRecord> {
    let record = AthleteRecord {
        id: state.assign_id(),
        name: body.name,
        goal: body.goal,
        profile: body.profile,
    };
    state.athletes.lock().unwrap().push(record.clone());
    Json(record)
}

async fn get_client(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    let athletes = state.athletes.lock().unwrap();
    match athletes.iter().find(|a| a.id.as_str() == id) {
        Some(record) => Json(record.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_client(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(body): Json<ClientBody>,
) -> Response {
    let mut athletes = state.athletes.lock().unwrap();
    match athletes.iter_mut().find(|a| a.id.as_str() == id) {
        Some(record) => {
            record.name = body.name;
            record.goal = body.goal;
            record.profile = body.profile;
            Json(record.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_client(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> StatusCode {
    let mut athletes = state.athletes.lock().unwrap();
    let before = athletes.len();
    athletes.retain(|a| a.id.as_str() != id);
    if athletes.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_sessions(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
) -> Json<Vec<TrainingSession>> {
    let sessions = state.sessions.lock().unwrap();
    Json(
        sessions
            .get(&AthleteId::new(id))
            .cloned()
            .unwrap_or_default(),
    )
}

async fn update_feedback(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Response {
    let mut sessions = state.sessions.lock().unwrap();
    let found = sessions
        .values_mut()
        .flat_map(|list| list.iter_mut())
        .find(|s| s.id.as_str() == id);
    match found {
        Some(session) => {
            session.feedback = Some(body.feedback);
            session.performance_rating = Some(body.performance_rating);
            Json(session.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ─── Identity provider handlers ──────────────────────────────────────────────

fn issue_tokens(state: &FakeState, serial: usize) -> serde_json::Value {
    let lifetime = state.token_lifetime_secs.load(Ordering::SeqCst);
    let exp = chrono::Utc::now().timestamp() + lifetime;
    let claims = serde_json::json!({
        "sub": "trainer-1",
        "preferred_username": USERNAME,
        "name": "Kim Coach",
        "email": "kim@example.com",
        "exp": exp,
    });
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .expect("Failed to create JWT");

    serde_json::json!({
        "access_token": access_token,
        "expires_in": lifetime,
        "refresh_token": format!("refresh-{}", serial),
        "token_type": "Bearer",
    })
}

fn invalid_grant(description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": description,
        })),
    )
        .into_response()
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("password") => {
            let ok = form.get("username").map(String::as_str) == Some(USERNAME)
                && form.get("password").map(String::as_str) == Some(PASSWORD);
            if !ok {
                return invalid_grant("Invalid user credentials");
            }
            let serial = state.logins.fetch_add(1, Ordering::SeqCst);
            Json(issue_tokens(&state, serial)).into_response()
        }
        Some("refresh_token") => {
            let serial = state.refreshes.fetch_add(1, Ordering::SeqCst);
            if !state.refresh_ok.load(Ordering::SeqCst) {
                return invalid_grant("Token is not active");
            }
            Json(issue_tokens(&state, 1000 + serial)).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unsupported grant").into_response(),
    }
}

async fn logout(State(state): State<Arc<FakeState>>) -> StatusCode {
    state.logouts.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}
