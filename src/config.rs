//! Configuration types for nzb-stream

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for the streaming gateway
///
/// Fields are organized into sub-configs, one per collaborator:
/// - [`manager`](ManagerConfig) - download manager API (job submission and history)
/// - [`share`](ShareConfig) - WebDAV file share exposing completed jobs
/// - [`poll`](PollConfig) - completion polling cadence
/// - [`locator`](LocatorConfig) - media file discovery
/// - [`cache`](CacheConfig) - stream resolution memoization
/// - [`fallback`](FallbackConfig) - local failure indicator asset
/// - [`server`](ServerIntegrationConfig) - REST API binding
///
/// Loading the configuration from disk is left to the embedding application.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download manager connection
    #[serde(default)]
    pub manager: ManagerConfig,

    /// File share connection
    #[serde(default)]
    pub share: ShareConfig,

    /// Completion polling
    #[serde(default)]
    pub poll: PollConfig,

    /// Media discovery
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Stream resolution cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Failure indicator asset
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// API server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Verify that everything needed to resolve a stream is configured
    ///
    /// Requires the manager base URL, the manager API key and the file share URL. Checked
    /// before any network call so a misconfigured gateway fails fast.
    pub fn require_streaming(&self) -> Result<()> {
        if is_blank(&self.manager.base_url) {
            return Err(Error::config(
                "download manager base URL is not configured",
                "manager.base_url",
            ));
        }
        if is_blank(&self.manager.api_key) {
            return Err(Error::config(
                "download manager API key is not configured",
                "manager.api_key",
            ));
        }
        if is_blank(&self.share.url) {
            return Err(Error::config(
                "file share URL is not configured",
                "share.url",
            ));
        }
        Ok(())
    }

    /// Category used for a given content type ("movie" or "series")
    pub fn category_for(&self, content_type: &str) -> &str {
        if content_type.eq_ignore_ascii_case("series") || content_type.eq_ignore_ascii_case("tv")
        {
            &self.manager.tv_category
        } else {
            &self.manager.movie_category
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Download manager (SABnzbd-compatible API) configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ManagerConfig {
    /// Base URL of the manager, e.g. "http://localhost:8080"
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent as the `apikey` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Category for movie jobs (default: "Movies")
    #[serde(default = "default_movie_category")]
    pub movie_category: String,

    /// Category for episodic jobs (default: "TV")
    #[serde(default = "default_tv_category")]
    pub tv_category: String,

    /// Number of history slots fetched per poll (default: 50)
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Timeout for each API call (default: 15 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            movie_category: default_movie_category(),
            tv_category: default_tv_category(),
            history_limit: default_history_limit(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// WebDAV file share configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareConfig {
    /// Base URL of the WebDAV share, e.g. "http://localhost:3000"
    #[serde(default)]
    pub url: Option<String>,

    /// Basic auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Directory holding completed jobs, laid out as `<root>/<category>/<job>` (default: "/content")
    #[serde(default = "default_content_root")]
    pub content_root: String,

    /// Whether the share answers HEAD requests (default: true)
    ///
    /// When false, HEAD is emulated with a `Range: bytes=0-0` GET.
    #[serde(default = "default_true")]
    pub head_supported: bool,

    /// Timeout for listings and HEAD requests (default: 15 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Connect timeout for streaming reads (default: 10 seconds)
    ///
    /// Streaming reads carry no total timeout since a playback session can last hours.
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            content_root: default_content_root(),
            head_supported: true,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// Completion polling configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PollConfig {
    /// Delay between history queries (default: 2 seconds, never below 100 ms)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub interval: Duration,

    /// Give up after this long (default: 80 seconds)
    #[serde(default = "default_poll_deadline", with = "duration_serde")]
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            deadline: default_poll_deadline(),
        }
    }
}

/// Media discovery configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LocatorConfig {
    /// Maximum directory depth below the job root (default: 6)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// File extensions treated as playable video, without the dot
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            video_extensions: default_video_extensions(),
        }
    }
}

/// Stream resolution cache configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheConfig {
    /// Lifetime of ready and failed entries (default: 1 hour)
    #[serde(default = "default_cache_ttl", with = "duration_serde")]
    pub ttl: Duration,

    /// Cache a poll timeout as a terminal failure after this many consecutive timeouts
    /// for the same key (default: never)
    #[serde(default)]
    pub poll_timeout_escalation: Option<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_cache_ttl(),
            poll_timeout_escalation: None,
        }
    }
}

/// Local failure indicator configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FallbackConfig {
    /// Media file served when a job has failed (default: "assets/stream-failed.mp4")
    #[serde(default = "default_fallback_asset")]
    pub asset_path: PathBuf,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            asset_path: default_fallback_asset(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:7000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            swagger_ui: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_movie_category() -> String {
    "Movies".to_string()
}

fn default_tv_category() -> String {
    "TV".to_string()
}

fn default_history_limit() -> u32 {
    50
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_content_root() -> String {
    "/content".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_poll_deadline() -> Duration {
    Duration::from_secs(80)
}

fn default_max_depth() -> usize {
    6
}

fn default_video_extensions() -> Vec<String> {
    [
        "mkv", "mp4", "m4v", "avi", "mov", "wmv", "mpg", "mpeg", "ts", "m2ts", "webm", "flv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_fallback_asset() -> PathBuf {
    PathBuf::from("assets/stream-failed.mp4")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7000))
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
