//! Typed errors and their envelope/status mapping.
//!
//! Validation failures are caller errors (`fail`, 400) and are handled inside
//! the single CRUD operation that produced them. Everything else is a server
//! fault (`exception`, 500) and propagates to the axum response mapping below.
//! Because every failure is an `Err` travelling through `?`, no statement can
//! execute past a failed response -- the termination guarantee is structural.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Setup and contract errors: wrong at registration time or a caller that is
/// a programmer, not an end user.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown callback validator: {0}")]
    UnknownCallback(String),
    #[error("duplicate resource path: {0}")]
    DuplicatePath(String),
    #[error("field rules: {0}")]
    Load(String),
    /// A value the operation cannot run without (e.g. the DELETE identifier).
    #[error("{0} is not defined.")]
    Undefined(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Wrong HTTP verb reached a handler: fatal to the request.
    #[error("Bad request.")]
    MethodMismatch,
    /// Recoverable caller input error; message names the offending field.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("JSON contents cannot be decoded.")]
    Decode,
    #[error("Password hashing failed.")]
    Hash,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, Envelope::fail(msg.clone())),
            _ => {
                crate::logger::log_exception(&self.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::exception(self.to_string()),
                )
            }
        };
        (status, Json(envelope)).into_response()
    }
}
