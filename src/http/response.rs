//! # JSON response envelope.
//!
//! ```text
//! {"status_code":200,"code":0,"message":"","data":{...}}
//! ```
//! `data` is omitted when absent. `status_code` is also the HTTP status of the reply.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

/// Uniform JSON reply body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T = ()> {
    /// HTTP status, echoed in the body.
    pub status_code: u16,
    /// Application-level result code.
    pub code: i32,
    /// Human-readable message; empty by default.
    pub message: String,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Response<T> {
    /// `200 OK` reply carrying `data`.
    pub fn new(code: i32, data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            code,
            message: String::new(),
            data: Some(data),
        }
    }

    /// Overrides the HTTP status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = status.as_u16();
        self
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Response<()> {
    /// `200 OK` reply without payload.
    pub fn empty(code: i32) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            code,
            message: String::new(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn data_is_omitted_when_absent() {
        let body = serde_json::to_value(Response::empty(7).with_message("nothing")).unwrap();
        assert_eq!(
            body,
            json!({"status_code": 200, "code": 7, "message": "nothing"})
        );
    }

    #[test]
    fn payload_and_status_are_serialized() {
        let resp = Response::new(0, json!({"id": 3})).with_status(StatusCode::CREATED);
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            body,
            json!({"status_code": 201, "code": 0, "message": "", "data": {"id": 3}})
        );
    }

    #[test]
    fn status_code_drives_the_reply() {
        let reply = Response::new(1, "gone")
            .with_status(StatusCode::NOT_FOUND)
            .into_response();
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    }
}
