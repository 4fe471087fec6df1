//! Local failure indicator asset.

use super::{FAILURE_REASON_HEADER, failure_reason_value};
use crate::error::Result;
use crate::range::ByteRange;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::Response;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Serve the fallback asset, honoring `Range` and `HEAD`
///
/// The failure reason is attached as the `X-Stream-Failure-Reason` header on every
/// response, including 416.
///
/// # Errors
///
/// - [`Error::Io`](crate::Error::Io) if the asset cannot be opened, read or seeked
pub async fn serve_fallback(
    asset_path: &Path,
    method: &Method,
    headers: &HeaderMap,
    reason: &str,
) -> Result<Response> {
    let mut file = File::open(asset_path).await?;
    let size = file.metadata().await?.len();
    let range = ByteRange::parse(headers.get(header::RANGE), size);

    tracing::warn!(
        asset = %asset_path.display(),
        reason,
        range = ?range,
        "Serving stream failure indicator"
    );

    let (status, body) = match range {
        ByteRange::Unsatisfiable => (StatusCode::RANGE_NOT_SATISFIABLE, Body::empty()),
        _ if method == Method::HEAD => (status_for(&range), Body::empty()),
        ByteRange::Full => (StatusCode::OK, Body::from_stream(ReaderStream::new(file))),
        ByteRange::Partial { start, end } => {
            file.seek(std::io::SeekFrom::Start(start)).await?;
            let stream = ReaderStream::new(file.take(end - start + 1));
            (StatusCode::PARTIAL_CONTENT, Body::from_stream(stream))
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let out = response.headers_mut();
    out.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    out.insert(header::CONTENT_LENGTH, HeaderValue::from(range.served_len(size)));
    if let Some(content_range) = range.content_range(size)
        && let Ok(value) = HeaderValue::from_str(&content_range)
    {
        out.insert(header::CONTENT_RANGE, value);
    }
    if let Some(mime) = mime_guess::from_path(asset_path).first()
        && let Ok(value) = HeaderValue::from_str(mime.as_ref())
    {
        out.insert(header::CONTENT_TYPE, value);
    }
    out.insert(FAILURE_REASON_HEADER, failure_reason_value(reason));

    Ok(response)
}

fn status_for(range: &ByteRange) -> StatusCode {
    match range {
        ByteRange::Full => StatusCode::OK,
        ByteRange::Partial { .. } => StatusCode::PARTIAL_CONTENT,
        ByteRange::Unsatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
    }
}
