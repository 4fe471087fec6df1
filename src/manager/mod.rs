//! Download manager integration.
//!
//! The gateway talks to the manager through the [`DownloadManager`] trait:
//! - [`submit`] - hands an NZB URL to the manager's queue (Job Submitter)
//! - [`poll`] - waits for the job to reach a terminal state (Completion Poller)
//! - [`sabnzbd`] - SABnzbd-compatible HTTP implementation
//! - [`fields`] - normalization of the manager's inconsistently named response fields

pub mod fields;
mod poll;
mod sabnzbd;
mod submit;


pub use poll::{MIN_POLL_INTERVAL, wait_for_completion};
pub use sabnzbd::SabnzbdClient;
pub use submit::submit_job;

use crate::error::Result;
use crate::types::{HistorySlot, JobId};
use async_trait::async_trait;

/// Window of the manager's history to fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryPage {
    /// Index of the first slot
    pub start: u32,
    /// Maximum number of slots
    pub limit: u32,
}

impl HistoryPage {
    /// The most recent `limit` slots
    pub fn first(limit: u32) -> Self {
        Self { start: 0, limit }
    }
}

/// Queueing and history API of a download manager
///
/// Implementations perform exactly one network call per method invocation and never
/// retry; retry policy belongs to the callers.
#[async_trait]
pub trait DownloadManager: Send + Sync {
    /// Queue an NZB by URL and return the manager's job id
    ///
    /// # Errors
    ///
    /// - [`Error::Submission`](crate::Error::Submission) if the manager rejects the job or
    ///   its answer carries no job id
    /// - [`Error::Network`](crate::Error::Network) on transport failure
    async fn submit(&self, url: &str, category: &str, label: Option<&str>) -> Result<JobId>;

    /// Fetch one page of job history for a category
    ///
    /// # Errors
    ///
    /// - [`Error::Manager`](crate::Error::Manager) if the API reports an error
    /// - [`Error::Network`](crate::Error::Network) on transport failure
    async fn history(&self, category: &str, page: HistoryPage) -> Result<Vec<HistorySlot>>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}
