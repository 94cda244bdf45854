//! Storefront API server: builds the resource registry, connects to
//! PostgreSQL, and mounts the resource and common routes.

use axum::Router;
use std::path::PathBuf;
use storefront_engine::{common_routes, resource_routes, AppState, Registry};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("storefront_engine=info".parse()?),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/storefront".into());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let mut registry = Registry::builtin()?;
    if let Ok(dir) = std::env::var("FIELD_RULES_DIR") {
        let overridden = registry.load_rule_overrides(&PathBuf::from(dir))?;
        tracing::info!(overridden, "loaded field rule overrides");
    }
    let state = AppState::new(pool, registry);

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/v1", resource_routes(state))
        .layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
