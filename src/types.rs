//! Core types for nzb-stream

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque job identifier assigned by the download manager
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new JobId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a download job as reported by the manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in the manager's queue
    Queued,
    /// Downloading, verifying, repairing or unpacking
    Running,
    /// Finished; output is on the file share
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl JobStatus {
    /// Map a manager status string to a JobStatus (case-insensitive)
    pub fn from_manager(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "queued" | "paused" | "grabbing" | "fetching" => JobStatus::Queued,
            _ => JobStatus::Running,
        }
    }

    /// Whether polling can stop
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One entry of the manager's job history
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HistorySlot {
    /// Job id
    pub job_id: JobId,
    /// Normalized status
    pub status: JobStatus,
    /// Name of the output directory (may differ from the submitted label)
    pub job_name: Option<String>,
    /// Category the job finished under (may differ from the requested one)
    pub category: Option<String>,
    /// Failure reason for failed jobs
    pub failure_reason: Option<String>,
}

/// Season/episode requested for episodic content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct RequestedEpisode {
    /// Season number
    pub season: u32,
    /// Episode number
    pub episode: u32,
}

impl RequestedEpisode {
    /// Create a new RequestedEpisode
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }

    /// Parse the trailing "season:episode" pair of a content id such as `tt0903747:1:3`
    pub fn from_content_id(content_id: &str) -> Option<Self> {
        let mut parts = content_id.rsplit(':');
        let episode = parts.next()?.trim().parse().ok()?;
        let season = parts.next()?.trim().parse().ok()?;
        // A bare "1:3" has no title part; still accept it
        Some(Self { season, episode })
    }
}

impl std::fmt::Display for RequestedEpisode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}E{}", self.season, self.episode)
    }
}

/// A successfully resolved stream: where the playable file lives on the share
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedStream {
    /// Job that produced the file
    pub job_id: JobId,
    /// Category the job completed under
    pub category: String,
    /// Output directory name of the job
    pub job_name: String,
    /// Path of the file on the share
    pub view_path: String,
    /// File name component of `view_path`
    pub file_name: String,
    /// File size in bytes
    pub size_bytes: u64,
}

/// Snapshot of the stream cache, exposed on the admin API
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CacheStats {
    /// Builds in flight
    pub pending: usize,
    /// Memoized successes
    pub ready: usize,
    /// Memoized job failures
    pub failed: usize,
}
