//! Range-aware media responses.
//!
//! - [`remote`] - relays a file from the share, passing Range/HEAD semantics through
//! - [`local`] - serves the local failure indicator asset with full range support

pub mod local;
pub mod remote;

pub use local::serve_fallback;
pub use remote::forward;

use axum::http::HeaderValue;

/// Response header carrying the reason a stream could not be resolved
pub const FAILURE_REASON_HEADER: &str = "x-stream-failure-reason";

const MAX_REASON_LEN: usize = 200;

/// Header-safe rendition of a failure reason: visible ASCII only, bounded in length
pub fn failure_reason_value(reason: &str) -> HeaderValue {
    let sanitized: String = reason
        .chars()
        .map(|c| if c.is_ascii_graphic() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let truncated: String = sanitized.chars().take(MAX_REASON_LEN).collect();

    HeaderValue::from_str(&truncated).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_value_is_sanitized() {
        assert_eq!(
            failure_reason_value("Aborted, cannot be completed"),
            "Aborted, cannot be completed"
        );
        assert_eq!(failure_reason_value("line one\r\nline two"), "line one line two");
        assert_eq!(failure_reason_value("Fehlgeschlägen"), "Fehlgeschl gen");
        assert_eq!(failure_reason_value(&"x".repeat(500)).len(), MAX_REASON_LEN);
    }
}
