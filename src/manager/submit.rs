//! Job submission.

use super::DownloadManager;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::JobId;

/// Hand an NZB URL to the download manager and return the new job's id
///
/// Configuration and inputs are validated before any network call. Exactly one queueing
/// call is made; failures are returned as-is without retry.
///
/// # Errors
///
/// - [`Error::Config`] if the manager or file share is not configured
/// - [`Error::InvalidRequest`] if `download_url` or `category` is empty
/// - [`Error::Submission`] if the manager rejects the job or returns no job id
pub async fn submit_job(
    manager: &dyn DownloadManager,
    config: &Config,
    download_url: &str,
    category: &str,
    label: Option<&str>,
) -> Result<JobId> {
    config.require_streaming()?;

    if download_url.trim().is_empty() {
        return Err(Error::InvalidRequest("download URL is required".to_string()));
    }
    if category.trim().is_empty() {
        return Err(Error::InvalidRequest("category is required".to_string()));
    }

    let job_id = manager.submit(download_url, category, label).await?;

    tracing::info!(
        job_id = %job_id,
        category,
        label = label.unwrap_or_default(),
        manager = manager.name(),
        "Job submitted to download manager"
    );

    Ok(job_id)
}
