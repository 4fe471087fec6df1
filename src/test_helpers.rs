//! Shared in-memory collaborators for unit tests.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manager::{DownloadManager, HistoryPage};
use crate::share::{FileShare, ShareEntry, normalize_path};
use crate::types::{HistorySlot, JobId, JobStatus};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Config with every streaming prerequisite filled in
pub(crate) fn streaming_config() -> Config {
    let mut config = Config::default();
    config.manager.base_url = Some("http://manager.invalid".to_string());
    config.manager.api_key = Some("test-key".to_string());
    config.share.url = Some("http://share.invalid".to_string());
    config
}

/// What one history call reports for the scripted job
#[derive(Clone, Debug)]
pub(crate) enum HistoryStep {
    /// The job is not in history
    Absent,
    /// The job has this status
    Status(JobStatus),
    /// The job failed with this reason
    Failed(&'static str),
    /// The history call itself fails
    ApiError,
}

/// Download manager double with a scripted history
///
/// History steps are consumed in order; the last one repeats forever.
pub(crate) struct ScriptedManager {
    job_id: String,
    job_name: String,
    category: Option<String>,
    steps: Mutex<VecDeque<HistoryStep>>,
    submit_delay: Duration,
    history_delay: Duration,
    reject_submit: Option<&'static str>,
    pub(crate) submits: AtomicUsize,
    pub(crate) history_calls: AtomicUsize,
}

impl ScriptedManager {
    pub(crate) fn new(job_id: &str, job_name: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            job_name: job_name.to_string(),
            category: None,
            steps: Mutex::new(VecDeque::from([HistoryStep::Status(JobStatus::Completed)])),
            submit_delay: Duration::ZERO,
            history_delay: Duration::ZERO,
            reject_submit: None,
            submits: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_history(self, steps: Vec<HistoryStep>) -> Self {
        *self.steps.lock().unwrap() = steps.into();
        self
    }

    pub(crate) fn with_output_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub(crate) fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Every history call takes this long before answering
    pub(crate) fn with_history_delay(mut self, delay: Duration) -> Self {
        self.history_delay = delay;
        self
    }

    pub(crate) fn rejecting(mut self, reason: &'static str) -> Self {
        self.reject_submit = Some(reason);
        self
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub(crate) fn history_count(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> HistoryStep {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(HistoryStep::Absent)
        }
    }
}

#[async_trait]
impl DownloadManager for ScriptedManager {
    async fn submit(&self, _url: &str, _category: &str, _label: Option<&str>) -> Result<JobId> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        match self.reject_submit {
            Some(reason) => Err(Error::Submission(reason.to_string())),
            None => Ok(JobId::new(&self.job_id)),
        }
    }

    async fn history(&self, category: &str, _page: HistoryPage) -> Result<Vec<HistorySlot>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if !self.history_delay.is_zero() {
            tokio::time::sleep(self.history_delay).await;
        }
        let slot = |status, failure_reason: Option<&str>| HistorySlot {
            job_id: JobId::new(&self.job_id),
            status,
            job_name: Some(self.job_name.clone()),
            category: Some(self.category.clone().unwrap_or_else(|| category.to_string())),
            failure_reason: failure_reason.map(str::to_string),
        };

        match self.next_step() {
            HistoryStep::Absent => Ok(vec![]),
            HistoryStep::Status(status) => Ok(vec![slot(status, None)]),
            HistoryStep::Failed(reason) => Ok(vec![slot(JobStatus::Failed, Some(reason))]),
            HistoryStep::ApiError => Err(Error::Manager("history unavailable".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// In-memory file share recording every listed path
#[derive(Default)]
pub(crate) struct MemoryShare {
    dirs: HashMap<String, Vec<ShareEntry>>,
    failing: HashSet<String>,
    listed: Mutex<Vec<String>>,
}

impl MemoryShare {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating every parent directory up to `/`
    pub(crate) fn with_file(mut self, path: &str, size: u64) -> Self {
        let path = normalize_path(path);
        self.add_entry(ShareEntry::file(path, size));
        self
    }

    /// Add an explicit directory entry (which may point anywhere, e.g. back to an ancestor)
    pub(crate) fn with_dir_entry(mut self, parent: &str, entry_path: &str) -> Self {
        self.dirs
            .entry(normalize_path(parent))
            .or_default()
            .push(ShareEntry::directory(entry_path));
        self
    }

    pub(crate) fn failing(mut self, path: &str) -> Self {
        self.failing.insert(normalize_path(path));
        self
    }

    pub(crate) fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    fn add_entry(&mut self, entry: ShareEntry) {
        let Some((parent, _)) = entry.path.rsplit_once('/') else {
            return;
        };
        let parent = normalize_path(parent);
        let siblings = self.dirs.entry(parent.clone()).or_default();
        if siblings.iter().any(|e| e.path == entry.path) {
            return;
        }
        siblings.push(entry);
        if parent != "/" {
            self.add_entry(ShareEntry::directory(parent));
        }
    }
}

#[async_trait]
impl FileShare for MemoryShare {
    async fn list(&self, path: &str) -> Result<Vec<ShareEntry>> {
        let path = normalize_path(path);
        self.listed.lock().unwrap().push(path.clone());
        if self.failing.contains(&path) {
            return Err(Error::Share(format!("PROPFIND {path} returned HTTP 500")));
        }
        Ok(self.dirs.get(&path).cloned().unwrap_or_default())
    }
}
