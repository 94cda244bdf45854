//! CRUD template engine: pure statement planning plus sqlx execution.

pub mod crud;
pub mod params;
pub mod sql;

pub use crud::CrudEngine;
pub use params::{BindValue, ParamMap};
pub use sql::Statement;
