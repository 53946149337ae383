// --- File: crates/rowkeeper_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ApiError, HttpStatusCode};

/// Extension trait for ApiError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for ApiError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();

        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

/// Implement IntoResponse for ApiError to make it easier to use in Axum handlers.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a `Result<T, ApiError>` to a `Result<Json<T>, Response>`.
pub fn handle_json_result<T>(result: Result<T, ApiError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Wraps a list of serializable values into a `200 OK` JSON array response.
pub fn json_list_response<T>(items: Vec<T>) -> Response
where
    T: serde::Serialize,
{
    (StatusCode::OK, Json(items)).into_response()
}
