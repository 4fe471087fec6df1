//! Relay of a file from the share.

use crate::error::Result;
use crate::share::WebDavShare;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::Response;
use futures::TryStreamExt;

/// Client headers forwarded to the share; everything else is dropped
const PASSTHROUGH_HEADERS: [HeaderName; 6] = [
    header::RANGE,
    header::IF_RANGE,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    header::ACCEPT_ENCODING,
    header::USER_AGENT,
];

/// Forward a GET or HEAD for `path` to the share and relay the answer
///
/// Upstream status and headers are relayed unchanged except `Transfer-Encoding`. When the
/// share cannot answer HEAD (`head_supported == false`), HEAD is sent as a one-byte GET and
/// the answer is reshaped to look like a plain HEAD response. HEAD never carries a body.
///
/// # Errors
///
/// - [`Error::Proxy`](crate::Error::Proxy) if the share cannot be reached
pub async fn forward(
    share: &WebDavShare,
    path: &str,
    method: &Method,
    client_headers: &HeaderMap,
    head_supported: bool,
) -> Result<Response> {
    let mut upstream_headers = HeaderMap::new();
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = client_headers.get(&name) {
            upstream_headers.insert(name, value.clone());
        }
    }

    let is_head = method == Method::HEAD;
    let client_range = client_headers.contains_key(header::RANGE);
    let emulate_head = is_head && !head_supported;

    let upstream_method = if is_head && head_supported {
        Method::HEAD
    } else {
        Method::GET
    };
    if emulate_head && !client_range {
        upstream_headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-0"));
    }

    let upstream = share.read(upstream_method.clone(), path, upstream_headers).await?;
    let mut status = upstream.status();
    let mut headers = upstream.headers().clone();
    headers.remove(header::TRANSFER_ENCODING);

    tracing::debug!(
        path,
        method = %method,
        upstream_method = %upstream_method,
        status = %status,
        "Relaying file share response"
    );

    if emulate_head && !client_range && status == StatusCode::PARTIAL_CONTENT {
        status = StatusCode::OK;
        match headers
            .remove(header::CONTENT_RANGE)
            .as_ref()
            .and_then(total_length)
        {
            Some(total) => {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(total));
            }
            None => {
                headers.remove(header::CONTENT_LENGTH);
            }
        }
    }

    let body = if is_head {
        Body::empty()
    } else {
        Body::from_stream(upstream.bytes_stream().map_err(std::io::Error::other))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Total size from a `Content-Range: bytes a-b/total` value
fn total_length(content_range: &HeaderValue) -> Option<u64> {
    content_range
        .to_str()
        .ok()?
        .rsplit_once('/')?
        .1
        .trim()
        .parse()
        .ok()
}
