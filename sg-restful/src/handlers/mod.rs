//! HTTP routes
//!
//! | Method   | Path                            | Backend method |
//! |----------|---------------------------------|----------------|
//! | `GET`    | `/`                             | `info`         |
//! | `GET`    | `/{entity_type}`                | `read`         |
//! | `POST`   | `/{entity_type}`                | `create`       |
//! | `GET`    | `/{entity_type}/summarize`      | `summarize`    |
//! | `GET`    | `/{entity_type}/{id}`           | `read`         |
//! | `PATCH`  | `/{entity_type}/{id}`           | `update`       |
//! | `DELETE` | `/{entity_type}/{id}`           | `delete`       |
//! | `POST`   | `/{entity_type}/{id}/revive`    | `revive`       |
//!
//! Everything except `/` requires Basic credentials (see
//! [`middleware::auth`](crate::middleware::auth)).

mod entity;
mod index;
mod params;

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::auth;
use crate::state::AppState;

pub use index::IndexResponse;
pub use params::{apply_field_params, apply_read_params, apply_summarize_params, RawParams};

/// Build the gateway router
pub fn router(state: AppState) -> Router {
    let entities = Router::new()
        .route("/{entity_type}", get(entity::get_all).post(entity::create))
        .route("/{entity_type}/summarize", get(entity::summarize))
        .route(
            "/{entity_type}/{id}",
            get(entity::get).patch(entity::update).delete(entity::delete),
        )
        .route("/{entity_type}/{id}/revive", post(entity::revive))
        .route_layer(from_fn_with_state(state.clone(), auth::middleware));

    Router::new()
        .route("/", get(index::index))
        .route("/favicon.ico", get(|| async { StatusCode::NOT_FOUND }))
        .merge(entities)
        .with_state(state)
}
