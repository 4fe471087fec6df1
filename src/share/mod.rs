//! Network file share holding completed job output.
//!
//! - [`FileShare`] - directory listing seam used by the media locator
//! - [`WebDavShare`] - WebDAV implementation (PROPFIND listings, ranged GET/HEAD reads)
//! - [`multistatus`] - PROPFIND response parsing

pub mod multistatus;
mod webdav;

pub use webdav::WebDavShare;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One node of a directory listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareEntry {
    /// Last path component
    pub name: String,
    /// Absolute path on the share, without a trailing slash
    pub path: String,
    /// Whether the node is a directory
    pub is_directory: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, when the share reports it
    pub last_modified: Option<DateTime<Utc>>,
}

impl ShareEntry {
    /// Directory entry
    pub fn directory(path: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        Self {
            name: file_name(&path).to_string(),
            path,
            is_directory: true,
            size: 0,
            last_modified: None,
        }
    }

    /// File entry
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        let path = normalize_path(&path.into());
        Self {
            name: file_name(&path).to_string(),
            path,
            is_directory: false,
            size,
            last_modified: None,
        }
    }
}

/// Directory listing API of the file share
#[async_trait]
pub trait FileShare: Send + Sync {
    /// List the immediate children of a directory
    ///
    /// The directory itself is not part of the result.
    ///
    /// # Errors
    ///
    /// - [`Error::Share`](crate::Error::Share) if the share refuses the listing or answers
    ///   with something unparseable
    /// - [`Error::Network`](crate::Error::Network) on transport failure
    async fn list(&self, path: &str) -> Result<Vec<ShareEntry>>;
}

/// Canonical form of a share path: leading slash, no trailing slash, no empty segments
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Join a directory path and a child name
pub fn join_path(dir: &str, name: &str) -> String {
    normalize_path(&format!("{dir}/{name}"))
}

/// Last component of a path
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}
