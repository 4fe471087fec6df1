//! Stream handler.

use crate::api::AppState;
use crate::api::error_response::error_response;
use crate::error::Error;
use crate::gateway::StreamRequest;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
};

/// GET|HEAD /stream - Resolve a title and stream it
///
/// The first request for a title submits the NZB and waits for the download manager to
/// finish it; later requests reuse the resolution. Range requests are passed through to
/// the file share. For a failed job, a short indicator video is served instead, with the
/// reason in `X-Stream-Failure-Reason`.
#[utoipa::path(
    get,
    path = "/stream",
    tag = "stream",
    params(StreamRequest),
    responses(
        (status = 200, description = "Whole file"),
        (status = 206, description = "Requested byte range"),
        (status = 400, description = "Missing or invalid query parameters", body = crate::error::ApiError),
        (status = 404, description = "The finished job holds no video file", body = crate::error::ApiError),
        (status = 416, description = "Range start lies beyond the end of the file"),
        (status = 502, description = "Download manager or file share failure", body = crate::error::ApiError),
        (status = 503, description = "Gateway is not configured for streaming", body = crate::error::ApiError),
        (status = 504, description = "The job did not finish in time", body = crate::error::ApiError)
    )
)]
pub async fn stream(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<StreamRequest>, QueryRejection>,
) -> Response {
    let request = match query {
        Ok(Query(request)) => request,
        Err(rejection) => {
            return Error::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    tracing::debug!(
        method = %method,
        download_url = %request.download_url,
        content_type = %request.content_type,
        range = headers.get(axum::http::header::RANGE).and_then(|v| v.to_str().ok()).unwrap_or_default(),
        "Stream request"
    );

    match state.gateway.stream(&request, &method, &headers).await {
        Ok(response) => response,
        Err(error) => error_response(&error),
    }
}
