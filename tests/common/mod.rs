//! In-process fake backend served over real HTTP.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const USERNAME: &str = "trader";
pub const PASSWORD: &str = "s3cret";
pub const VALID_TOKEN: &str = "integration-token";

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct BackendState {
    seen: Arc<Mutex<Vec<Seen>>>,
    revoked: Arc<AtomicBool>,
}

impl BackendState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {VALID_TOKEN}");
        !self.revoked.load(Ordering::SeqCst)
            && headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected)
    }
}

pub struct FakeBackend {
    pub base_url: String,
    state: BackendState,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = BackendState::default();
        let app = Router::new()
            .route("/ping", get(ping))
            .route("/auth/token", post(token))
            .route("/users/me", get(users_me))
            .route("/strategies", get(strategies))
            .route("/portfolio/:user_id", get(portfolio))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Reject every credential from now on
    pub fn revoke(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn seen_path(&self, path: &str) -> Vec<Seen> {
        self.seen().into_iter().filter(|s| s.path == path).collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record(State(state): State<BackendState>, request: Request, next: Next) -> Response {
    let seen = Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.seen.lock().unwrap().push(seen);
    next.run(request).await
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let valid = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    if !valid {
        return unauthorized("Incorrect username or password");
    }
    Json(json!({ "access_token": VALID_TOKEN, "token_type": "bearer" })).into_response()
}

async fn users_me(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized("Could not validate credentials");
    }
    Json(json!({ "id": 7, "username": USERNAME, "email": "trader@example.com" })).into_response()
}

async fn strategies(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized("Could not validate credentials");
    }
    Json(json!([
        { "id": 1, "name": "SMA crossover", "description": "20/50 day", "is_active": true },
        { "id": 2, "name": "RSI reversal", "description": null, "is_active": false }
    ]))
    .into_response()
}

async fn portfolio(
    State(state): State<BackendState>,
    Path(user_id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized("Could not validate credentials");
    }
    Json(json!([
        { "asset": "PETR4", "quantity": "100", "average_price": "28.50", "pnl": "150.00", "user_id": user_id }
    ]))
    .into_response()
}
