//! Stub backend and request helpers shared by the router tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use sg_restful::prelude::*;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// `fake-script:fake-key`
pub const SCRIPT_AUTH: &str = "Basic ZmFrZS1zY3JpcHQ6ZmFrZS1rZXk=";

/// Canned backend: answers every call with the same status and body, and
/// records the JSON-RPC payloads it receives.
#[derive(Clone)]
pub struct MockShotgun {
    pub host: String,
    received: Arc<Mutex<Vec<Value>>>,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn answer(State(canned): State<Canned>, body: Bytes) -> Response {
    if let Ok(payload) = serde_json::from_slice(&body) {
        canned.received.lock().unwrap().push(payload);
    }
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
        .into_response()
}

impl MockShotgun {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let canned = Canned {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            received: received.clone(),
        };
        let app = Router::new()
            .route("/api3/json", post(answer))
            .with_state(canned);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            host: format!("http://{addr}"),
            received,
        }
    }

    /// Payloads received so far, oldest first
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    /// Gateway router pointed at this backend
    pub fn gateway(&self) -> Router {
        gateway_for(&self.host)
    }
}

pub fn gateway_for(host: &str) -> Router {
    let mut config = Config::default();
    config.backend.host = host.to_string();
    config.backend.timeout_secs = 5;
    config.validate().unwrap();
    router(AppState::new(config).unwrap())
}

/// Host that refuses connections
pub async fn dead_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// `path?k=v&..` with percent-encoded values
pub fn uri(path: &str, params: &[(&str, &str)]) -> String {
    let url = reqwest::Url::parse_with_params(&format!("http://gateway{path}"), params).unwrap();
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", url.path()),
        _ => url.path().to_string(),
    }
}

pub fn basic(scheme: &str, plain: &str) -> String {
    format!("{scheme} {}", STANDARD.encode(plain))
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, SCRIPT_AUTH)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, SCRIPT_AUTH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // axum rejections answer in plain text
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, value)
}
