//! Gateway tying the resolution cache to the proxy.
//!
//! [`StreamGateway`] is what the HTTP layer talks to: it turns a [`StreamRequest`] into a
//! cache key, resolves it at most once per key, and answers with either the relayed file,
//! the local failure indicator (for failed jobs), or an error for the caller to render.

use crate::cache::{Outcome, StreamCache, StreamKey};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manager::{DownloadManager, SabnzbdClient};
use crate::proxy;
use crate::resolver::{ResolveRequest, StreamResolver};
use crate::share::WebDavShare;
use crate::types::{CacheStats, RequestedEpisode};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Inbound stream request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StreamRequest {
    /// NZB download URL picked by the indexer search
    pub download_url: String,
    /// "movie" or "series"
    #[serde(default)]
    pub content_type: String,
    /// Content id, optionally ending in "season:episode" (e.g. "tt0903747:1:3")
    #[serde(default)]
    pub content_id: Option<String>,
    /// Title, suggested to the manager as the job name
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit season (wins over the content id)
    #[serde(default)]
    pub season: Option<u32>,
    /// Explicit episode (wins over the content id)
    #[serde(default)]
    pub episode: Option<u32>,
}

impl StreamRequest {
    /// Requested episode; only series content asks for one
    pub fn requested_episode(&self) -> Option<RequestedEpisode> {
        let is_series = self.content_type.eq_ignore_ascii_case("series")
            || self.content_type.eq_ignore_ascii_case("tv");
        if !is_series {
            return None;
        }

        match (self.season, self.episode) {
            (Some(season), Some(episode)) => Some(RequestedEpisode::new(season, episode)),
            _ => self
                .content_id
                .as_deref()
                .and_then(RequestedEpisode::from_content_id),
        }
    }
}

/// Streaming gateway (cloneable - collaborators are Arc-wrapped)
#[derive(Clone)]
pub struct StreamGateway {
    config: Arc<Config>,
    cache: StreamCache,
    resolver: StreamResolver,
    share: Arc<WebDavShare>,
}

impl StreamGateway {
    /// Create a gateway talking to a SABnzbd-compatible manager and a WebDAV share
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a configured URL cannot be parsed
    /// - [`Error::Network`] if an HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let manager = Arc::new(SabnzbdClient::new(&config.manager)?);
        let share = Arc::new(WebDavShare::new(&config.share)?);
        Ok(Self::with_parts(config, manager, share))
    }

    /// Create a gateway over explicit collaborators
    pub fn with_parts(
        config: Config,
        manager: Arc<dyn DownloadManager>,
        share: Arc<WebDavShare>,
    ) -> Self {
        let config = Arc::new(config);
        let resolver = StreamResolver::new(config.clone(), manager, share.clone());
        Self {
            cache: StreamCache::new(config.cache.clone()),
            config,
            resolver,
            share,
        }
    }

    /// Gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cache key of a request
    pub fn key(&self, request: &StreamRequest) -> StreamKey {
        StreamKey::new(
            request.download_url.trim(),
            self.config.category_for(&request.content_type),
            request.requested_episode(),
        )
    }

    /// Resolve a request to a file on the share, at most once per key
    pub async fn resolve(&self, request: &StreamRequest) -> Outcome {
        let key = self.key(request);
        let resolve = ResolveRequest {
            download_url: key.download_url.clone(),
            category: key.category.clone(),
            label: request
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            episode: key.episode,
        };

        let resolver = self.resolver.clone();
        self.cache
            .get_or_resolve(key, move || async move { resolver.resolve(resolve).await })
            .await
    }

    /// Resolve and answer a GET or HEAD request
    ///
    /// A resolved file is relayed from the share. A failed job is answered with the local
    /// failure indicator. Every other error is returned for the caller to render, since
    /// no bytes have been sent yet.
    pub async fn stream(
        &self,
        request: &StreamRequest,
        method: &Method,
        headers: &HeaderMap,
    ) -> std::result::Result<Response, Arc<Error>> {
        match self.resolve(request).await {
            Ok(stream) => proxy::forward(
                &self.share,
                &stream.view_path,
                method,
                headers,
                self.config.share.head_supported,
            )
            .await
            .map_err(Arc::new),
            Err(error) if matches!(*error, Error::JobFailed { .. }) => proxy::serve_fallback(
                &self.config.fallback.asset_path,
                method,
                headers,
                &error.failure_reason(),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failure indicator asset unavailable");
                error
            }),
            Err(error) => Err(error),
        }
    }

    /// Counts of cache entries by state
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drop every cached resolution
    pub async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    /// Drop the cached resolution of one request
    pub async fn invalidate(&self, request: &StreamRequest) -> bool {
        self.cache.invalidate(&self.key(request)).await
    }
}
