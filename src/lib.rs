//! Storefront engine: configuration-driven CRUD backend library.
//!
//! Every resource (user, product, order, ...) is a [`schema::ResourceConfig`]
//! value, not a handler hierarchy: the [`engine::CrudEngine`] turns an HTTP verb
//! plus a config into a validated, parameterized SQL statement and a uniform
//! JSON envelope.

pub mod case;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod id;
pub mod logger;
pub mod password;
pub mod registry;
pub mod resources;
pub mod response;
pub mod routes;
pub mod sanitize;
pub mod schema;
pub mod state;
pub mod validate;

pub use engine::{CrudEngine, Statement};
pub use error::{ApiError, ConfigError};
pub use id::OpaqueId;
pub use registry::{Registry, ResourceSpec};
pub use response::{Envelope, Reply, Status};
pub use routes::{common_routes, resource_routes};
pub use schema::{ColumnKind, ColumnSpec, FieldRule, FieldSchema, ResourceConfig};
pub use state::AppState;

use serde_json::Value;
use std::collections::HashMap;

/// A request record: camelCase field name to scalar value, assembled from
/// path/query arguments and the decoded request body.
pub type Record = HashMap<String, Value>;
