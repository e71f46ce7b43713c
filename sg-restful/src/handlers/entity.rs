//! Entity CRUD handlers
//!
//! Each handler translates one REST call into one backend method. Backend
//! exceptions on writes go through the per-operation [`ExceptionClassifier`];
//! exceptions on reads are reported as 500 with the backend message.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{Map, Value};

use super::params::{apply_field_params, apply_read_params, apply_summarize_params, RawParams};
use crate::classify::ExceptionClassifier;
use crate::error::{Error, Result};
use crate::rpc::{
    CreateQuery, EntityPage, EntityRef, ReadQuery, RpcResponse, Shotgun, SummarizeQuery,
    SummaryResults, UpdateQuery,
};
use crate::state::AppState;

/// Fail with the classified error if the backend reported an exception
fn check_exception<T>(
    classifier: &ExceptionClassifier,
    method: &str,
    response: &RpcResponse<T>,
) -> Result<()> {
    let category = classifier.classify(response.exception, response.message());
    match Error::from_category(category, response.message()) {
        Some(err) => {
            tracing::warn!(method, %category, message = response.message(), "backend exception");
            Err(err)
        }
        None => Ok(()),
    }
}

/// Fail with 500 and the backend message if a read reported an exception
fn check_read_exception<T>(method: &str, response: &RpcResponse<T>) -> Result<()> {
    if response.exception {
        tracing::warn!(method, message = response.message(), "backend exception");
        return Err(Error::Backend(response.message().to_string()));
    }
    Ok(())
}

/// Decode a request body that must be a JSON object
fn object_body(body: &Bytes) -> Result<Map<String, Value>> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        Error::BadRequest(e.to_string())
    })
}

/// `GET /{entity_type}`: list entities
///
/// 200 with a JSON array, or 204 when nothing matched.
pub async fn get_all(
    State(state): State<AppState>,
    Extension(sg): Extension<Shotgun>,
    Path(entity_type): Path<String>,
    Query(params): Query<RawParams>,
) -> Result<Response> {
    let query = apply_read_params(ReadQuery::new(&entity_type), &params, state.formats())?;
    tracing::debug!(entity_type = %entity_type, ?query, "read");

    let response: RpcResponse<EntityPage> = sg.call("read", &query).await?;
    check_read_exception("read", &response)?;

    let entities = response.results.unwrap_or_default().entities;
    if entities.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(entities).into_response())
}

/// `GET /{entity_type}/{id}`: one entity
pub async fn get(
    Extension(sg): Extension<Shotgun>,
    Path((entity_type, id)): Path<(String, i64)>,
    Query(params): Query<RawParams>,
) -> Result<Json<Map<String, Value>>> {
    let query = apply_field_params(ReadQuery::by_id(&entity_type, id), &params);
    tracing::debug!(entity_type = %entity_type, id, "read one");

    let response: RpcResponse<EntityPage> = sg.call("read", &query).await?;
    check_read_exception("read", &response)?;

    response
        .results
        .unwrap_or_default()
        .entities
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("{entity_type} {id} not found")))
}

/// `POST /{entity_type}`: create from a JSON object body; 201 on success
pub async fn create(
    Extension(sg): Extension<Shotgun>,
    Path(entity_type): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Map<String, Value>>)> {
    let object = object_body(&body)?;
    let query = CreateQuery::new(&entity_type, object);
    tracing::debug!(entity_type = %entity_type, fields = query.fields.len(), "create");

    let response: RpcResponse<Map<String, Value>> = sg.call("create", &query).await?;
    check_exception(&ExceptionClassifier::for_create(), "create", &response)?;

    Ok((StatusCode::CREATED, Json(response.results.unwrap_or_default())))
}

/// `PATCH /{entity_type}/{id}`: update fields from a JSON object body
pub async fn update(
    Extension(sg): Extension<Shotgun>,
    Path((entity_type, id)): Path<(String, i64)>,
    body: Bytes,
) -> Result<Json<Map<String, Value>>> {
    let object = object_body(&body)?;
    let query = UpdateQuery::new(&entity_type, id, object);
    tracing::debug!(entity_type = %entity_type, id, fields = query.fields.len(), "update");

    let response: RpcResponse<Map<String, Value>> = sg.call("update", &query).await?;
    check_exception(&ExceptionClassifier::for_update(), "update", &response)?;

    Ok(Json(response.results.unwrap_or_default()))
}

/// Shared body of delete and revive: `results == true` is success, anything else 404
async fn retire_or_revive(
    sg: &Shotgun,
    method: &str,
    classifier: ExceptionClassifier,
    entity_type: String,
    id: i64,
) -> Result<StatusCode> {
    let query = EntityRef::new(entity_type, id);
    tracing::debug!(method, entity_type = %query.entity_type, id, "entity state change");

    let response: RpcResponse<bool> = sg.call(method, &query).await?;
    check_exception(&classifier, method, &response)?;

    if response.results != Some(true) {
        return Err(Error::NotFound(format!(
            "{} {} was not changed by {method}",
            query.entity_type, query.id
        )));
    }
    Ok(StatusCode::OK)
}

/// `DELETE /{entity_type}/{id}`: retire an entity
pub async fn delete(
    Extension(sg): Extension<Shotgun>,
    Path((entity_type, id)): Path<(String, i64)>,
) -> Result<StatusCode> {
    retire_or_revive(&sg, "delete", ExceptionClassifier::for_delete(), entity_type, id).await
}

/// `POST /{entity_type}/{id}/revive`: restore a retired entity
pub async fn revive(
    Extension(sg): Extension<Shotgun>,
    Path((entity_type, id)): Path<(String, i64)>,
) -> Result<StatusCode> {
    retire_or_revive(&sg, "revive", ExceptionClassifier::for_revive(), entity_type, id).await
}

/// `GET /{entity_type}/summarize`: aggregate over matching entities
pub async fn summarize(
    State(state): State<AppState>,
    Extension(sg): Extension<Shotgun>,
    Path(entity_type): Path<String>,
    Query(params): Query<RawParams>,
) -> Result<Json<SummaryResults>> {
    let query =
        apply_summarize_params(SummarizeQuery::new(&entity_type), &params, state.formats())?;
    tracing::debug!(entity_type = %entity_type, ?query, "summarize");

    let response: RpcResponse<SummaryResults> = sg.call("summarize", &query).await?;
    check_read_exception("summarize", &response)?;

    Ok(Json(response.results.unwrap_or_default()))
}
