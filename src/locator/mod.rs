//! Media file discovery on the file share.
//!
//! A completed job lands under `<content_root>/<category>/<job_name>`. The locator walks
//! that tree breadth-first, bounded in depth, and picks the best video file:
//! the largest file matching the requested episode, otherwise the largest video overall.

mod episode;


pub use episode::EpisodeMatcher;

use crate::config::LocatorConfig;
use crate::share::{FileShare, join_path, normalize_path};
use crate::types::RequestedEpisode;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// A playable file found during traversal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Whether the name matches the requested season/episode
    pub matches_requested_episode: bool,
    /// Absolute path on the share
    pub remote_path: String,
}

/// Breadth-first media finder
#[derive(Clone)]
pub struct MediaLocator {
    share: Arc<dyn FileShare>,
    content_root: String,
    config: LocatorConfig,
}

impl MediaLocator {
    /// Create a locator over a file share
    pub fn new(share: Arc<dyn FileShare>, content_root: &str, config: LocatorConfig) -> Self {
        Self {
            share,
            content_root: normalize_path(content_root),
            config,
        }
    }

    /// Root directory of a job's output
    pub fn job_root(&self, category: &str, job_name: &str) -> String {
        join_path(&join_path(&self.content_root, category), job_name)
    }

    fn is_video(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.config
            .video_extensions
            .iter()
            .any(|v| v.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Find the best video file of a completed job
    ///
    /// Directories deeper than `max_depth` below the job root are never listed and no path
    /// is listed twice. A failed listing is logged and only that subtree is skipped.
    /// Returns `None` when the tree holds no video file at all.
    pub async fn locate(
        &self,
        category: &str,
        job_name: &str,
        episode: Option<RequestedEpisode>,
    ) -> Option<CandidateFile> {
        let root = self.job_root(category, job_name);
        let matcher = episode.map(EpisodeMatcher::new);

        let mut queue = VecDeque::from([(root.clone(), 0usize)]);
        let mut visited = HashSet::from([root.clone()]);
        let mut best_episode: Option<CandidateFile> = None;
        let mut best_overall: Option<CandidateFile> = None;

        while let Some((dir, depth)) = queue.pop_front() {
            let entries = match self.share.list(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %dir, depth, error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            for entry in entries {
                let path = normalize_path(&entry.path);
                if entry.is_directory {
                    if depth < self.config.max_depth && visited.insert(path.clone()) {
                        queue.push_back((path, depth + 1));
                    }
                    continue;
                }
                if !self.is_video(&entry.name) {
                    continue;
                }

                // Folder names below the job root can carry the season
                let relative = path
                    .strip_prefix(root.as_str())
                    .unwrap_or(&path)
                    .trim_start_matches('/');
                let matches = matcher.as_ref().is_some_and(|m| m.matches(relative));
                let candidate = CandidateFile {
                    name: entry.name,
                    size_bytes: entry.size,
                    matches_requested_episode: matches,
                    remote_path: path,
                };

                if matches && is_larger(&candidate, best_episode.as_ref()) {
                    best_episode = Some(candidate.clone());
                }
                if is_larger(&candidate, best_overall.as_ref()) {
                    best_overall = Some(candidate);
                }
            }
        }

        let chosen = best_episode.or(best_overall);
        match &chosen {
            Some(file) => tracing::info!(
                root = %root,
                file = %file.remote_path,
                size = file.size_bytes,
                episode_match = file.matches_requested_episode,
                "Located media file"
            ),
            None => tracing::warn!(root = %root, "No video file found"),
        }
        chosen
    }
}

fn is_larger(candidate: &CandidateFile, current: Option<&CandidateFile>) -> bool {
    current.is_none_or(|c| candidate.size_bytes > c.size_bytes)
}
