//! Resource request handlers. Each resolves the resource from the path
//! segment and defers to the CRUD engine; nothing here is per-resource.

use crate::case::{to_camel_case, to_display_name};
use crate::engine::CrudEngine;
use crate::error::{ApiError, ConfigError};
use crate::registry::ResourceSpec;
use crate::response::Reply;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::Method,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::Record;

fn resolve<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a ResourceSpec, ApiError> {
    state
        .registry
        .get(path_segment)
        .ok_or_else(|| ConfigError::Undefined(to_display_name(path_segment)).into())
}

/// Query parameters arrive as text; the validator and sanitizer decide what
/// they mean per field.
fn args_from_query(params: HashMap<String, String>) -> Record {
    params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn args_with_pk(spec: &ResourceSpec, id: String) -> Record {
    let mut args = Record::new();
    args.insert(to_camel_case(&spec.config.pk), Value::String(id));
    args
}

/// A body that is not a JSON object is indistinguishable from one that failed
/// to decode; both surface the same message.
fn body_to_record(body: &str) -> Result<Record, ApiError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        _ => Err(ApiError::Decode),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    CrudEngine::get(&state.pool, spec, &method, &args_from_query(params)).await
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    method: Method,
    body: String,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    let content = body_to_record(&body)?;
    CrudEngine::post(&state.pool, spec, &method, &content).await
}

/// DELETE on the collection: the id must come through the query string, and a
/// request without one is a caller-contract error, not a no-op.
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    CrudEngine::delete(&state.pool, spec, &method, &args_from_query(params)).await
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    method: Method,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    let args = args_with_pk(spec, id);
    CrudEngine::get(&state.pool, spec, &method, &args).await
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    method: Method,
    body: String,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    let args = args_with_pk(spec, id);
    let content = body_to_record(&body)?;
    CrudEngine::put(&state.pool, spec, &method, &args, &content).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    method: Method,
) -> Result<Reply, ApiError> {
    let spec = resolve(&state, &path_segment)?;
    let args = args_with_pk(spec, id);
    CrudEngine::delete(&state.pool, spec, &method, &args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_must_be_a_json_object() {
        assert!(body_to_record(r#"{"name": "Widget"}"#).is_ok());
        assert!(matches!(body_to_record("not json"), Err(ApiError::Decode)));
        assert!(matches!(body_to_record("[1, 2]"), Err(ApiError::Decode)));
    }

    #[test]
    fn query_values_stay_text() {
        let mut params = HashMap::new();
        params.insert("price".to_string(), "19.99".to_string());
        let args = args_from_query(params);
        assert_eq!(args["price"], json!("19.99"));
    }
}
