//! HTTP error response handling for the API
//!
//! Maps gateway errors to a status code plus a JSON [`ApiError`] body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Render an error, including one shared between cache callers
pub fn error_response(error: &Error) -> Response {
    let status_code =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status_code, Json(ApiError::from(error))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Without the originating Error the status is unknown
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
