//! # nzb-stream
//!
//! Streaming gateway that turns an NZB download URL into a seekable HTTP video stream.
//!
//! A media player asks for a title; the gateway hands the NZB to a SABnzbd-compatible
//! download manager, waits for the job to finish, finds the playable file on the WebDAV
//! share the manager writes to, and relays it with full `Range` support.
//!
//! ## Design Philosophy
//!
//! - **Resolve once** - concurrent and repeated requests for the same title share a
//!   single submission through the [`StreamCache`]
//! - **Fail visibly** - a failed download is answered with a short indicator video the
//!   player can show, and is remembered so it is not resubmitted
//! - **Retry transient errors** - timeouts and network errors are never memoized
//! - **Library-first** - the HTTP server is a thin layer over [`StreamGateway`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use nzb_stream::{Config, StreamGateway, run_with_shutdown};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.manager.base_url = Some("http://localhost:8080".to_string());
//!     config.manager.api_key = Some("sabnzbd-api-key".to_string());
//!     config.share.url = Some("http://localhost:3000".to_string());
//!
//!     let gateway = Arc::new(StreamGateway::new(config)?);
//!     run_with_shutdown(gateway).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Single-flight stream resolution cache
pub mod cache;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Request entry point tying the cache to the proxy
pub mod gateway;
/// Media file discovery on the share
pub mod locator;
/// Download manager client, submission and completion polling
pub mod manager;
/// Range-aware relay and local failure indicator
pub mod proxy;
/// HTTP `Range` header handling
pub mod range;
/// Submit, wait and locate pipeline
pub mod resolver;
/// WebDAV file share access
pub mod share;
/// Core types
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use cache::{StreamCache, StreamKey};
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use gateway::{StreamGateway, StreamRequest};
pub use locator::{CandidateFile, MediaLocator};
pub use manager::{DownloadManager, SabnzbdClient};
pub use range::ByteRange;
pub use resolver::{ResolveRequest, StreamResolver};
pub use share::{FileShare, ShareEntry, WebDavShare};
pub use types::{
    CacheStats, HistorySlot, JobId, JobStatus, RequestedEpisode, ResolvedStream,
};

/// Serve the REST API until a termination signal arrives.
///
/// The server stops accepting connections on the signal and lets in-flight streams finish.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use nzb_stream::{Config, StreamGateway, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let gateway = Arc::new(StreamGateway::new(Config::default())?);
///
///     // Run with automatic signal handling
///     run_with_shutdown(gateway).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(gateway: std::sync::Arc<StreamGateway>) -> Result<()> {
    let config = std::sync::Arc::new(gateway.config().clone());
    api::serve_with_shutdown(gateway, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
