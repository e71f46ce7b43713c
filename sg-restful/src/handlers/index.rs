//! `GET /`: gateway and backend versions

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::middleware::parse_authorization;
use crate::rpc::{Credentials, ServerInfo};
use crate::state::AppState;
use crate::VERSION;

/// Response body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Backend version as `vMAJOR.MINOR.PATCH`
    pub shotgun_version: String,
    /// Version of this gateway
    pub rest_version: String,
}

/// Report versions
///
/// Public: callers' credentials are used when present and well formed,
/// placeholder script credentials otherwise (`info` does not check them).
/// A backend 4xx becomes 500, a 5xx becomes 502.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexResponse>> {
    let credentials = parse_authorization(&headers)
        .unwrap_or_else(|_| Credentials::script("fake-script", "fake-key"));
    let sg = state.connections().connect(credentials)?;

    let response = sg.request("info", &Map::<String, Value>::new()).await?;
    let status = response.status();
    if status.is_client_error() {
        tracing::error!(%status, "backend rejected info request");
        return Err(Error::Internal(format!("backend responded with {status}")));
    }
    if status.is_server_error() {
        return Err(Error::BadGateway(format!("backend responded with {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Internal(format!("could not read backend info: {e}")))?;
    let info: ServerInfo = serde_json::from_slice(&body)
        .map_err(|e| Error::Internal(format!("could not decode backend info: {e}")))?;
    let shotgun_version = info
        .version_string()
        .ok_or_else(|| Error::Internal("backend info carries no version".to_string()))?;

    Ok(Json(IndexResponse {
        shotgun_version,
        rest_version: VERSION.to_string(),
    }))
}
