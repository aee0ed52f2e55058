//! Response helpers shared by the pipeline fallthrough and the stock stages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub fn error_body(code: &str, message: String, details: Option<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

/// Response for a request that ran past the last stage of its pipeline without
/// any stage writing a response.
pub fn fallthrough(method: &axum::http::Method, path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(error_body(
            "not_found",
            format!("no stage produced a response for {} {}", method, path),
            None,
        )),
    )
        .into_response()
}

/// JSON response with an optional status, defaulting to 200.
pub fn json_with_status(data: serde_json::Value, status: Option<StatusCode>) -> Response {
    (status.unwrap_or(StatusCode::OK), Json(data)).into_response()
}
