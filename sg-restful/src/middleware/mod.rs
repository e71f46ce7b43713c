//! Middleware for authentication and request tracking

pub mod auth;
pub mod request_tracking;

pub use auth::{parse_authorization, ConnectionCache, USER_SCHEME};
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, sensitive_headers_layer, SENSITIVE_HEADERS,
};
