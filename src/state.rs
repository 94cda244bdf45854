//! Shared application state, built once in main and cloned into handlers.

use crate::registry::Registry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(pool: PgPool, registry: Registry) -> Self {
        AppState {
            pool,
            registry: Arc::new(registry),
        }
    }
}
