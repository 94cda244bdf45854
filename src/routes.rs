//! Route tables. Resource routes are parameterized on the path segment;
//! handlers resolve the resource from the registry.

use crate::handlers::{create, delete, delete_collection, list, read, update};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/:path_segment",
            get(list).post(create).delete(delete_collection),
        )
        .route("/:path_segment/:id", get(read).put(update).delete(delete))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(
    State(state): State<AppState>,
) -> Result<Json<HealthBody>, (axum::http::StatusCode, Json<HealthBody>)> {
    if sqlx::query("SELECT 1")
        .fetch_optional(&state.pool)
        .await
        .is_err()
    {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody { status: "degraded" }),
        ));
    }
    Ok(Json(HealthBody { status: "ok" }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, /ready (with DB check), /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
