//! Single-flight, TTL-based memoization of stream resolution.
//!
//! Each [`StreamKey`] maps to at most one entry, which is either a build in flight
//! (`Pending`) or a committed outcome (`Ready` / `Failed`). Builds run on their own task,
//! so a caller that goes away never cancels a build other callers are waiting on.
//!
//! Only cacheable errors (see [`Error::is_cacheable`]) are committed as `Failed`; any
//! other error removes the entry so the next request starts over.


use crate::config::CacheConfig;
use crate::error::Error;
use crate::types::{CacheStats, RequestedEpisode, ResolvedStream};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Outcome shared by every caller of one build
pub type Outcome = std::result::Result<ResolvedStream, Arc<Error>>;

type SharedBuild = Shared<BoxFuture<'static, Outcome>>;

/// Content identity: what makes two stream requests the same
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StreamKey {
    /// NZB download URL
    pub download_url: String,
    /// Manager category
    pub category: String,
    /// Requested episode, for episodic content
    pub episode: Option<RequestedEpisode>,
}

impl StreamKey {
    /// Create a new StreamKey
    pub fn new(
        download_url: impl Into<String>,
        category: impl Into<String>,
        episode: Option<RequestedEpisode>,
    ) -> Self {
        Self {
            download_url: download_url.into(),
            category: category.into(),
            episode,
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.category, self.download_url)?;
        if let Some(episode) = self.episode {
            write!(f, "|{episode}")?;
        }
        Ok(())
    }
}

enum EntryState {
    Pending { build: SharedBuild, generation: u64 },
    Ready(ResolvedStream),
    Failed(Arc<Error>),
}

struct CacheEntry {
    state: EntryState,
    /// Unset while pending
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<StreamKey, CacheEntry>,
    /// Consecutive poll timeouts per key, for the escalation policy
    timeouts: HashMap<StreamKey, u32>,
    next_generation: u64,
}

impl CacheState {
    fn evict_expired(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.expires_at.is_none_or(|expires| expires > now));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired stream cache entries");
        }
    }

    fn is_current(&self, key: &StreamKey, generation: u64) -> bool {
        matches!(
            self.entries.get(key),
            Some(CacheEntry { state: EntryState::Pending { generation: g, .. }, .. }) if *g == generation
        )
    }
}

/// Stream resolution cache (cloneable - state is Arc-wrapped)
///
/// One instance is owned by the gateway for the lifetime of the process; tests build
/// independent instances.
#[derive(Clone)]
pub struct StreamCache {
    state: Arc<Mutex<CacheState>>,
    config: CacheConfig,
}

impl StreamCache {
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            config,
        }
    }

    /// Return the memoized outcome for `key`, or run `build` exactly once to produce it
    ///
    /// Concurrent callers for the same key share one build and observe the same outcome.
    /// `build` is only invoked when no live entry exists.
    pub async fn get_or_resolve<F, Fut>(&self, key: StreamKey, build: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<ResolvedStream>> + Send + 'static,
    {
        let shared = {
            let mut state = self.state.lock().await;
            state.evict_expired(Instant::now());

            match state.entries.get(&key).map(|entry| &entry.state) {
                Some(EntryState::Ready(stream)) => {
                    tracing::debug!(key = %key, "Stream cache hit");
                    return Ok(stream.clone());
                }
                Some(EntryState::Failed(error)) => {
                    tracing::debug!(key = %key, error = %error, "Stream cache hit (failed)");
                    return Err(error.clone());
                }
                Some(EntryState::Pending { build, .. }) => {
                    tracing::debug!(key = %key, "Joining in-flight stream resolution");
                    build.clone()
                }
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;

                    tracing::debug!(key = %key, generation, "Starting stream resolution");
                    let build = self.spawn_build(key.clone(), generation, build());
                    state.entries.insert(
                        key,
                        CacheEntry {
                            state: EntryState::Pending {
                                build: build.clone(),
                                generation,
                            },
                            expires_at: None,
                        },
                    );
                    build
                }
            }
        };

        shared.await
    }

    fn spawn_build<Fut>(&self, key: StreamKey, generation: u64, future: Fut) -> SharedBuild
    where
        Fut: Future<Output = crate::Result<ResolvedStream>> + Send + 'static,
    {
        let cache = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = future.await;
            cache.commit(&task_key, generation, result).await
        });

        let cache = self.clone();
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Stream resolution task aborted");
                    cache.discard(&key, generation).await;
                    Err(Arc::new(Error::Other(format!(
                        "stream resolution task aborted: {e}"
                    ))))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Record the outcome of a build, if its entry is still the live one
    async fn commit(
        &self,
        key: &StreamKey,
        generation: u64,
        result: crate::Result<ResolvedStream>,
    ) -> Outcome {
        let mut state = self.state.lock().await;
        let current = state.is_current(key, generation);
        let expires_at = Some(Instant::now() + self.config.ttl);

        match result {
            Ok(stream) => {
                if current {
                    state.timeouts.remove(key);
                    state.entries.insert(
                        key.clone(),
                        CacheEntry {
                            state: EntryState::Ready(stream.clone()),
                            expires_at,
                        },
                    );
                }
                tracing::info!(
                    key = %key,
                    job_id = %stream.job_id,
                    path = %stream.view_path,
                    size = stream.size_bytes,
                    "Stream resolved"
                );
                Ok(stream)
            }
            Err(error) => {
                // Superseded builds leave the timeout count alone
                let escalated = current && self.record_timeout(&mut state, key, &error);
                let error = Arc::new(error);

                if error.is_cacheable() || escalated {
                    if current {
                        state.timeouts.remove(key);
                        state.entries.insert(
                            key.clone(),
                            CacheEntry {
                                state: EntryState::Failed(error.clone()),
                                expires_at,
                            },
                        );
                    }
                    tracing::error!(key = %key, error = %error, escalated, "Stream resolution failed permanently");
                } else {
                    if current {
                        state.entries.remove(key);
                    }
                    tracing::warn!(key = %key, error = %error, "Stream resolution failed, will retry on next request");
                }
                Err(error)
            }
        }
    }

    /// Count a poll timeout; true when the escalation threshold is reached
    fn record_timeout(&self, state: &mut CacheState, key: &StreamKey, error: &Error) -> bool {
        if !matches!(error, Error::PollTimeout { .. }) {
            state.timeouts.remove(key);
            return false;
        }
        let Some(threshold) = self.config.poll_timeout_escalation else {
            return false;
        };

        let count = state.timeouts.entry(key.clone()).or_insert(0);
        *count += 1;
        tracing::debug!(key = %key, timeouts = *count, threshold, "Poll timeout recorded");
        *count >= threshold
    }

    async fn discard(&self, key: &StreamKey, generation: u64) {
        let mut state = self.state.lock().await;
        if state.is_current(key, generation) {
            state.entries.remove(key);
        }
    }

    /// Drop the entry for a key; an in-flight build finishes but is not recorded
    pub async fn invalidate(&self, key: &StreamKey) -> bool {
        let mut state = self.state.lock().await;
        state.evict_expired(Instant::now());
        state.timeouts.remove(key);
        state.entries.remove(key).is_some()
    }

    /// Drop every entry
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        state.timeouts.clear();
        let cleared = state.entries.len();
        state.entries.clear();
        tracing::info!(cleared, "Stream cache cleared");
        cleared
    }

    /// Count live entries by state
    pub async fn stats(&self) -> CacheStats {
        let mut state = self.state.lock().await;
        state.evict_expired(Instant::now());

        let mut stats = CacheStats::default();
        for entry in state.entries.values() {
            match entry.state {
                EntryState::Pending { .. } => stats.pending += 1,
                EntryState::Ready(_) => stats.ready += 1,
                EntryState::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}
