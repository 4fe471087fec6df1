//! HTTP byte-range handling for locally served media.

use axum::http::HeaderValue;

/// What part of a file a request asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteRange {
    /// Whole file (no Range header, or one that is not understood)
    Full,
    /// Inclusive byte span, already clamped to the file
    Partial {
        /// First byte
        start: u64,
        /// Last byte (inclusive)
        end: u64,
    },
    /// Start lies beyond the end of the file
    Unsatisfiable,
}

impl ByteRange {
    /// Interpret a `Range` header against a file of `size` bytes
    ///
    /// Accepts a single `bytes=<start>-<end>` span where either bound may be omitted:
    /// a missing start reads from 0 and a missing end reads to the last byte. An end past
    /// the file or before the start is clamped to the last byte. Anything else, including
    /// multi-range requests, is ignored and yields [`ByteRange::Full`].
    pub fn parse(header: Option<&HeaderValue>, size: u64) -> Self {
        let Some(spec) = header
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().strip_prefix("bytes="))
        else {
            return ByteRange::Full;
        };

        let Some((start, end)) = spec.trim().split_once('-') else {
            return ByteRange::Full;
        };
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() && end.is_empty() {
            return ByteRange::Full;
        }

        let Some(start) = parse_bound(start, 0) else {
            return ByteRange::Full;
        };
        let last = size.saturating_sub(1);
        let Some(end) = parse_bound(end, last) else {
            return ByteRange::Full;
        };

        if start >= size {
            return ByteRange::Unsatisfiable;
        }
        let end = if end > last || end < start { last } else { end };
        ByteRange::Partial { start, end }
    }

    /// Number of bytes served for a file of `size` bytes
    pub fn served_len(&self, size: u64) -> u64 {
        match self {
            ByteRange::Full => size,
            ByteRange::Partial { start, end } => end - start + 1,
            ByteRange::Unsatisfiable => 0,
        }
    }

    /// `Content-Range` value, if the response carries one
    pub fn content_range(&self, size: u64) -> Option<String> {
        match self {
            ByteRange::Full => None,
            ByteRange::Partial { start, end } => Some(format!("bytes {start}-{end}/{size}")),
            ByteRange::Unsatisfiable => Some(format!("bytes */{size}")),
        }
    }
}

fn parse_bound(bound: &str, default: u64) -> Option<u64> {
    if bound.is_empty() {
        return Some(default);
    }
    if !bound.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    bound.parse().ok()
}
