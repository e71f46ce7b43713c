//! # sg-restful
//!
//! REST gateway in front of the Shotgun JSON-RPC API.
//!
//! ## Features
//!
//! - **CRUD routes**: list, read, create, update, delete, revive and summarize any entity type
//! - **Filter queries**: the `q` parameter accepts three grammars, selected per input
//!   (see [`query`])
//! - **Exception mapping**: backend exception messages become 403/404/409/400 per operation
//!   (see [`classify`])
//! - **Basic auth pass-through**: script or user credentials, with cached per-credential clients
//! - **Middleware stack**: request ids, sensitive-header masking, CORS, compression, timeouts,
//!   body limits, panic recovery
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests
//!
//! ## Example
//!
//! ```rust,no_run
//! use sg_restful::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut config = Config::load()?;
//!     config.backend.host = "https://studio.shotgunstudio.com".to_string();
//!     config.validate()?;
//!
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone())?;
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod query;
pub mod rpc;
pub mod server;
pub mod state;

/// Gateway version reported by `GET /`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{Category, ClassificationRule, ExceptionClassifier};
    pub use crate::config::{BackendConfig, Config, QueryConfig, ServiceConfig};
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::handlers::router;
    pub use crate::middleware::ConnectionCache;
    pub use crate::observability::init_tracing;
    pub use crate::query::{
        parse_query, FilterModel, FormatRegistry, LogicalOperator, QueryFormat, QueryParseError,
    };
    pub use crate::rpc::{Credentials, Shotgun};
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::VERSION;
}
