//! Completion polling.

use super::{DownloadManager, HistoryPage};
use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::types::{HistorySlot, JobId, JobStatus};
use std::time::Duration;
use tokio::time::Instant;

/// Lower bound on the delay between two history calls
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll the manager's history until the job reaches a terminal state
///
/// Returns the completed slot, whose job name and category describe where the output
/// landed on the file share. Non-terminal statuses and missing slots keep polling at
/// `config.interval` (at least [`MIN_POLL_INTERVAL`]) until `config.deadline` has elapsed.
/// The deadline also bounds each history call, so a manager that never answers still
/// ends in a timeout.
///
/// # Errors
///
/// - [`Error::JobFailed`] if the manager reports the job as failed
/// - [`Error::PollTimeout`] if the deadline passes first
/// - any error from a single history call, unchanged
pub async fn wait_for_completion(
    manager: &dyn DownloadManager,
    job_id: &JobId,
    category: &str,
    config: &PollConfig,
    history_limit: u32,
) -> Result<HistorySlot> {
    let started = Instant::now();
    let deadline = started + config.deadline;
    let interval = config.interval.max(MIN_POLL_INTERVAL);
    let timed_out = || Error::PollTimeout {
        job_id: job_id.to_string(),
        category: category.to_string(),
        waited: started.elapsed(),
    };
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        let history = manager.history(category, HistoryPage::first(history_limit));
        let slots = match tokio::time::timeout_at(deadline, history).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(job_id = %job_id, polls, "History call outlived the poll deadline");
                return Err(timed_out());
            }
        };

        match slots.into_iter().find(|slot| slot.job_id == *job_id) {
            Some(slot) if slot.status == JobStatus::Completed => {
                tracing::info!(
                    job_id = %job_id,
                    category,
                    job_name = slot.job_name.as_deref().unwrap_or_default(),
                    polls,
                    "Job completed"
                );
                return Ok(slot);
            }
            Some(slot) if slot.status == JobStatus::Failed => {
                let reason = slot
                    .failure_reason
                    .unwrap_or_else(|| "download manager reported failure".to_string());
                tracing::warn!(job_id = %job_id, category, reason = %reason, "Job failed");
                return Err(Error::JobFailed {
                    job_id: job_id.to_string(),
                    category: category.to_string(),
                    reason,
                });
            }
            Some(slot) => {
                tracing::debug!(job_id = %job_id, status = ?slot.status, polls, "Job still in progress");
            }
            None => {
                tracing::debug!(job_id = %job_id, polls, "Job not in history yet");
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out());
        }
        tokio::time::sleep_until((now + interval).min(deadline)).await;
    }
}
