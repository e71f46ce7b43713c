//! Basic authentication against the backend
//!
//! Callers authenticate with one of two schemes carrying base64 `name:secret`:
//!
//! | Scheme       | Credentials                      |
//! |--------------|----------------------------------|
//! | `Basic`      | script name and application key  |
//! | `Basic-User` | user login and password          |
//!
//! Credentials are not checked here; the backend rejects bad ones on the
//! first call. The middleware resolves a [`Shotgun`] client for the
//! credentials, reusing a cached one when possible, and stores it in the
//! request extensions for the handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashmap::DashMap;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::rpc::{Credentials, Shotgun};
use crate::state::AppState;

/// Scheme selecting user credentials; any other `Basic*` scheme means script
pub const USER_SCHEME: &str = "Basic-User";

/// Parse `Authorization: Basic <b64>` or `Authorization: Basic-User <b64>`
///
/// * missing header, no space, or a scheme not starting with `Basic`: 401
/// * payload that is not base64: 400
/// * decoded payload without `:`: 403
pub fn parse_authorization(headers: &HeaderMap) -> Result<Credentials> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let (scheme, payload) = value
        .split_once(' ')
        .ok_or_else(|| Error::Unauthorized("Missing or malformed Authorization header".into()))?;

    if !scheme.starts_with("Basic") {
        return Err(Error::Unauthorized(format!(
            "Unsupported authorization scheme '{scheme}'"
        )));
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|e| Error::BadRequest(format!("Invalid base64 credentials: {e}")))?;
    let decoded = String::from_utf8_lossy(&decoded);

    let (name, secret) = decoded
        .split_once(':')
        .ok_or_else(|| Error::Forbidden("Credentials must be of the form name:secret".into()))?;

    if scheme == USER_SCHEME {
        Ok(Credentials::user(name, secret))
    } else {
        Ok(Credentials::script(name, secret))
    }
}

/// Per-credential backend clients
///
/// Keyed by a BLAKE3 digest of host, scheme, name and secret so raw secrets
/// are never used as map keys. Holds at most `capacity` clients; inserting
/// into a full cache evicts an arbitrary entry first.
#[derive(Debug, Clone)]
pub struct ConnectionCache {
    connections: Arc<DashMap<String, Shotgun>>,
    http: reqwest::Client,
    host: String,
    api_path: String,
    capacity: usize,
}

impl ConnectionCache {
    /// Empty cache sharing one HTTP client built from `config`
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("sg-restful/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            connections: Arc::new(DashMap::new()),
            http,
            host: config.host.clone(),
            api_path: config.api_path.clone(),
            capacity: config.max_cached_connections.max(1),
        })
    }

    /// Cache key for `credentials` against this cache's host
    #[must_use]
    pub fn key(&self, credentials: &Credentials) -> String {
        let (name, secret) = match credentials {
            Credentials::Script {
                script_name,
                script_key,
            } => (script_name, script_key),
            Credentials::User {
                user_login,
                user_password,
            } => (user_login, user_password),
        };

        let mut hasher = blake3::Hasher::new();
        for part in [
            self.host.as_str(),
            if credentials.is_user() { "user" } else { "script" },
            name.as_str(),
            secret.as_str(),
        ] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Uncached client, e.g. for public endpoints
    pub fn connect(&self, credentials: Credentials) -> Result<Shotgun> {
        Ok(Shotgun::new(
            &self.host,
            &self.api_path,
            credentials,
            self.http.clone(),
        )?)
    }

    /// Cached client for `credentials`, created on first use
    pub fn get_or_connect(&self, credentials: Credentials) -> Result<Shotgun> {
        let key = self.key(&credentials);
        if let Some(existing) = self.connections.get(&key) {
            return Ok(existing.value().clone());
        }

        let connection = self.connect(credentials)?;
        if self.connections.len() >= self.capacity {
            let victim = self
                .connections
                .iter()
                .next()
                .map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.connections.remove(&victim);
                tracing::debug!("connection cache full, evicted one entry");
            }
        }
        self.connections.insert(key, connection.clone());
        Ok(connection)
    }

    /// Number of cached clients
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Resolve the caller's backend client and insert it into the request extensions
pub async fn middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> std::result::Result<Response, Error> {
    let credentials = parse_authorization(request.headers())?;
    tracing::debug!(
        login = credentials.login(),
        user = credentials.is_user(),
        "authenticated request"
    );

    let connection = state.connections().get_or_connect(credentials)?;
    request.extensions_mut().insert(connection);

    Ok(next.run(request).await)
}
