//! Uniform response envelope: `{status, message, data}` plus an HTTP code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Operation completed.
    Success,
    /// Caller input error (4xx).
    Fail,
    /// Server-side fault (5xx).
    Exception,
}

#[derive(Serialize, Debug)]
pub struct Envelope {
    pub status: Status,
    pub message: String,
    pub data: Vec<Value>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, data: Vec<Value>) -> Self {
        Envelope {
            status: Status::Success,
            message: message.into(),
            data,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Envelope {
            status: Status::Fail,
            message: message.into(),
            data: Vec::new(),
        }
    }

    pub fn exception(message: impl Into<String>) -> Self {
        Envelope {
            status: Status::Exception,
            message: message.into(),
            data: Vec::new(),
        }
    }
}

/// A finished success response: envelope paired with its status code.
/// Error paths never construct one; they surface as [`crate::ApiError`].
#[derive(Debug)]
pub struct Reply {
    pub code: StatusCode,
    pub envelope: Envelope,
}

impl Reply {
    pub fn ok(message: impl Into<String>, data: Vec<Value>) -> Self {
        Reply {
            code: StatusCode::OK,
            envelope: Envelope::success(message, data),
        }
    }

    pub fn created(message: impl Into<String>) -> Self {
        Reply {
            code: StatusCode::CREATED,
            envelope: Envelope::success(message, Vec::new()),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.code, Json(self.envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_lowercase_status() {
        let env = Envelope::success("", vec![serde_json::json!({"name": "Widget"})]);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "");
        assert_eq!(json["data"][0]["name"], "Widget");
    }

    #[test]
    fn fail_and_exception_carry_empty_data() {
        let fail = serde_json::to_value(Envelope::fail("nope")).unwrap();
        assert_eq!(fail["status"], "fail");
        assert_eq!(fail["data"].as_array().unwrap().len(), 0);
        let exc = serde_json::to_value(Envelope::exception("boom")).unwrap();
        assert_eq!(exc["status"], "exception");
    }

    #[test]
    fn created_reply_code() {
        assert_eq!(Reply::created("done.").code, StatusCode::CREATED);
        assert_eq!(Reply::ok("", Vec::new()).code, StatusCode::OK);
    }
}
