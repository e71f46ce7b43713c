//! Connection to one backend site under one set of credentials

use std::fmt;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::types::RpcResponse;

/// Default JSON-RPC endpoint path on the backend host
pub const DEFAULT_API_PATH: &str = "/api3/json";

/// Errors talking to the backend
#[derive(Debug, Error)]
pub enum RpcError {
    /// Host is not an absolute http(s) URL
    #[error("Host must start with http:// or https://, got '{0}'")]
    InvalidHost(String),

    /// Request never produced a response
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a server error status
    #[error("backend responded with {0}")]
    Status(StatusCode),

    /// Response body was not the expected JSON
    #[error("could not decode backend response: {0}")]
    Decode(String),
}

/// Credentials sent as the first RPC parameter
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Credentials {
    /// API script name and key
    Script {
        script_name: String,
        script_key: String,
    },
    /// Human user login and password
    User {
        user_login: String,
        user_password: String,
    },
}

impl Credentials {
    pub fn script(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Script {
            script_name: name.into(),
            script_key: key.into(),
        }
    }

    pub fn user(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::User {
            user_login: login.into(),
            user_password: password.into(),
        }
    }

    /// Script name or user login
    #[must_use]
    pub fn login(&self) -> &str {
        match self {
            Self::Script { script_name, .. } => script_name,
            Self::User { user_login, .. } => user_login,
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}

// Keys and passwords stay out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script { script_name, .. } => f
                .debug_struct("Script")
                .field("script_name", script_name)
                .field("script_key", &"[REDACTED]")
                .finish(),
            Self::User { user_login, .. } => f
                .debug_struct("User")
                .field("user_login", user_login)
                .field("user_password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a, P: ?Sized> {
    method_name: &'a str,
    params: (&'a Credentials, &'a P),
}

/// Backend JSON-RPC client
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections and is
/// shared by every `Shotgun` built from the same state.
///
/// # Example
///
/// ```rust
/// use sg_restful::rpc::{Credentials, Shotgun};
///
/// let sg = Shotgun::new(
///     "https://studio.example.com/some/path",
///     "/api3/json",
///     Credentials::script("reporting", "s3cret"),
///     reqwest::Client::new(),
/// )
/// .unwrap();
/// assert_eq!(sg.server_url(), "https://studio.example.com/api3/json");
///
/// assert!(Shotgun::new(
///     "studio.example.com",
///     "/api3/json",
///     Credentials::script("reporting", "s3cret"),
///     reqwest::Client::new(),
/// )
/// .is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Shotgun {
    server_url: Url,
    credentials: Credentials,
    http: reqwest::Client,
}

impl Shotgun {
    /// Client for `host` with the endpoint path replaced by `api_path`
    pub fn new(
        host: &str,
        api_path: &str,
        credentials: Credentials,
        http: reqwest::Client,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            server_url: server_url(host, api_path)?,
            credentials,
            http,
        })
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        self.server_url.as_str()
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// POST `{"method_name": method, "params": [credentials, params]}`
    ///
    /// Returns the raw response whatever its status.
    pub async fn request<P>(&self, method: &str, params: &P) -> Result<reqwest::Response, RpcError>
    where
        P: Serialize + ?Sized,
    {
        let body = RpcRequest {
            method_name: method,
            params: (&self.credentials, params),
        };
        tracing::debug!(
            method,
            login = self.credentials.login(),
            url = %self.server_url,
            "sending backend request"
        );

        let response = self
            .http
            .post(self.server_url.clone())
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }

    /// Call `method` and decode the response envelope
    ///
    /// A 5xx status is reported as [`RpcError::Status`]; other statuses are
    /// decoded since the backend reports exceptions in the body.
    pub async fn call<T, P>(&self, method: &str, params: &P) -> Result<RpcResponse<T>, RpcError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self.request(method, params).await?;
        let status = response.status();
        if status.is_server_error() {
            tracing::warn!(method, %status, "backend server error");
            return Err(RpcError::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(method, error = %e, "undecodable backend response");
            RpcError::Decode(e.to_string())
        })
    }
}

fn server_url(host: &str, api_path: &str) -> Result<Url, RpcError> {
    if !host.starts_with("http") {
        return Err(RpcError::InvalidHost(host.to_string()));
    }
    let mut url = Url::parse(host).map_err(|_| RpcError::InvalidHost(host.to_string()))?;
    url.set_path(api_path);
    Ok(url)
}
