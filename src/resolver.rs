//! The resolution pipeline: submit, wait for completion, locate the playable file.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::locator::MediaLocator;
use crate::manager::{DownloadManager, submit_job, wait_for_completion};
use crate::share::{FileShare, file_name};
use crate::types::{RequestedEpisode, ResolvedStream};
use std::sync::Arc;

/// Inputs of one pipeline run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveRequest {
    /// NZB download URL
    pub download_url: String,
    /// Manager category
    pub category: String,
    /// Job label suggested to the manager (usually the title)
    pub label: Option<String>,
    /// Requested episode, for episodic content
    pub episode: Option<RequestedEpisode>,
}

/// Runs the pipeline against a download manager and file share
#[derive(Clone)]
pub struct StreamResolver {
    config: Arc<Config>,
    manager: Arc<dyn DownloadManager>,
    locator: MediaLocator,
}

impl StreamResolver {
    /// Create a resolver over the given collaborators
    pub fn new(
        config: Arc<Config>,
        manager: Arc<dyn DownloadManager>,
        share: Arc<dyn FileShare>,
    ) -> Self {
        let locator = MediaLocator::new(
            share,
            &config.share.content_root,
            config.locator.clone(),
        );
        Self {
            config,
            manager,
            locator,
        }
    }

    /// Resolve a request into the file to stream
    ///
    /// The steps run strictly in order and the first error ends the run.
    pub async fn resolve(&self, request: ResolveRequest) -> Result<ResolvedStream> {
        let job_id = submit_job(
            self.manager.as_ref(),
            &self.config,
            &request.download_url,
            &request.category,
            request.label.as_deref(),
        )
        .await?;

        let slot = wait_for_completion(
            self.manager.as_ref(),
            &job_id,
            &request.category,
            &self.config.poll,
            self.config.manager.history_limit,
        )
        .await?;

        // The manager may rename the job or move it to another category
        let category = slot.category.unwrap_or_else(|| request.category.clone());
        let job_name = slot
            .job_name
            .or_else(|| request.label.clone())
            .ok_or_else(|| Error::Manager(format!("completed job {job_id} has no name")))?;

        let file = self
            .locator
            .locate(&category, &job_name, request.episode)
            .await
            .ok_or_else(|| Error::NoPlayableFile {
                category: category.clone(),
                job_name: job_name.clone(),
            })?;

        Ok(ResolvedStream {
            job_id,
            file_name: file_name(&file.remote_path).to_string(),
            view_path: file.remote_path,
            size_bytes: file.size_bytes,
            category,
            job_name,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{HistoryStep, MemoryShare, ScriptedManager, streaming_config};
    use crate::types::{JobId, JobStatus};

    fn request(category: &str, episode: Option<RequestedEpisode>) -> ResolveRequest {
        ResolveRequest {
            download_url: "http://indexer/get/1.nzb".to_string(),
            category: category.to_string(),
            label: Some("Requested.Title".to_string()),
            episode,
        }
    }

    fn resolver(manager: Arc<ScriptedManager>, share: MemoryShare) -> StreamResolver {
        StreamResolver::new(Arc::new(streaming_config()), manager, Arc::new(share))
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_completed_job() {
        let manager = Arc::new(
            ScriptedManager::new("nzo_1", "My.Movie.2024").with_history(vec![
                HistoryStep::Status(JobStatus::Queued),
                HistoryStep::Status(JobStatus::Queued),
                HistoryStep::Status(JobStatus::Completed),
            ]),
        );
        let share = MemoryShare::new()
            .with_file("/content/Movies/My.Movie.2024/My.Movie.2024.mkv", 1000)
            .with_file("/content/Movies/My.Movie.2024/sample.mkv", 10);

        let stream = resolver(manager.clone(), share)
            .resolve(request("Movies", None))
            .await
            .unwrap();

        assert_eq!(stream.job_id, JobId::new("nzo_1"));
        assert_eq!(stream.view_path, "/content/Movies/My.Movie.2024/My.Movie.2024.mkv");
        assert_eq!(stream.file_name, "My.Movie.2024.mkv");
        assert_eq!(stream.size_bytes, 1000);
        assert_eq!(manager.submit_count(), 1);
        assert_eq!(manager.history_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_renamed_job_and_category() {
        let manager = Arc::new(
            ScriptedManager::new("nzo_1", "Show.S01.1080p").with_output_category("tv-hd"),
        );
        let share = MemoryShare::new()
            .with_file("/content/tv-hd/Show.S01.1080p/Show.S01E01.mkv", 100)
            .with_file("/content/tv-hd/Show.S01.1080p/Show.S01E02.mkv", 90);

        let stream = resolver(manager, share)
            .resolve(request("TV", Some(RequestedEpisode::new(1, 2))))
            .await
            .unwrap();

        assert_eq!(stream.category, "tv-hd");
        assert_eq!(stream.job_name, "Show.S01.1080p");
        assert_eq!(stream.file_name, "Show.S01E02.mkv");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_playable_file() {
        let manager = Arc::new(ScriptedManager::new("nzo_1", "Empty"));
        let share = MemoryShare::new().with_file("/content/Movies/Empty/readme.nfo", 10);

        let result = resolver(manager, share).resolve(request("Movies", None)).await;
        match result {
            Err(Error::NoPlayableFile { category, job_name }) => {
                assert_eq!(category, "Movies");
                assert_eq!(job_name, "Empty");
            }
            other => panic!("expected no playable file, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failure_stops_pipeline() {
        let manager = Arc::new(
            ScriptedManager::new("nzo_1", "Broken")
                .with_history(vec![HistoryStep::Failed("Out of retention")]),
        );
        let share = MemoryShare::new();

        let result = resolver(manager, share).resolve(request("Movies", None)).await;
        assert!(matches!(result, Err(Error::JobFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_skips_polling() {
        let manager = Arc::new(ScriptedManager::new("nzo_1", "Movie").rejecting("bad nzb"));

        let result = resolver(manager.clone(), MemoryShare::new())
            .resolve(request("Movies", None))
            .await;
        assert!(matches!(result, Err(Error::Submission(_))));
        assert_eq!(manager.history_count(), 0);
    }
}
