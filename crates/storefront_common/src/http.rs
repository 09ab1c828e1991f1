// --- File: crates/storefront_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{HttpStatusCode, StorefrontError};

// Include the client module
pub mod client;

/// Extension trait for StorefrontError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// `{"error": "<message>"}` with the error's status.
    fn into_http_response(self) -> Response;

    /// `{"ok": false, "error": ...}` with the error's status.
    ///
    /// Client errors carry their message in `error`. Server errors report
    /// `"Server error"` and move the message to `detail`.
    fn into_envelope_response(self) -> Response;
}

impl StorefrontError {
    fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoHttpResponse for StorefrontError {
    fn into_http_response(self) -> Response {
        let status_code = self.http_status();
        let body = Json(json!({ "error": self.to_string() }));
        (status_code, body).into_response()
    }

    fn into_envelope_response(self) -> Response {
        let status_code = self.http_status();
        let body = if self.is_client_error() {
            json!({ "ok": false, "error": self.to_string() })
        } else {
            json!({ "ok": false, "error": "Server error", "detail": self.to_string() })
        };
        (status_code, Json(body)).into_response()
    }
}

/// Implement IntoResponse for StorefrontError to make it easier to use in Axum handlers.
impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Success envelope: `{"ok": true, ...fields of T}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(body: T) -> Self {
        Self { ok: true, body }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Converts a Result into an enveloped response.
pub fn handle_envelope_result<T>(result: Result<T, StorefrontError>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(body) => Envelope::new(body).into_response(),
        Err(err) => err.into_envelope_response(),
    }
}
