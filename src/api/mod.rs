//! REST API server module
//!
//! Exposes the streaming gateway over HTTP: the `/stream` endpoint consumed by media
//! players, plus a small admin surface (health, cache inspection, OpenAPI docs).

use crate::gateway::StreamGateway;
use crate::{Config, Result};
use axum::{Router, middleware, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Streaming
/// - `GET /stream` - Resolve and stream a title (Range aware)
/// - `HEAD /stream` - Same, headers only
///
/// ## Cache
/// - `GET /cache` - Cache entry counts
/// - `DELETE /cache` - Drop every cached resolution
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(gateway: Arc<StreamGateway>, config: Arc<Config>) -> Router {
    let state = AppState::new(gateway, config.clone());

    let router = Router::new()
        .route("/stream", get(routes::stream).head(routes::stream))
        .route("/cache", get(routes::cache_stats).delete(routes::clear_cache))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails; see [`serve_with_shutdown`] to stop it gracefully.
///
/// # Example
///
/// ```no_run
/// use nzb_stream::{Config, StreamGateway};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let gateway = Arc::new(StreamGateway::new((*config).clone())?);
///
/// nzb_stream::api::start_api_server(gateway, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(gateway: Arc<StreamGateway>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(gateway, config, std::future::pending()).await
}

/// Start the API server and stop accepting connections once `shutdown` resolves
///
/// In-flight streams are allowed to finish.
pub async fn serve_with_shutdown<F>(
    gateway: Arc<StreamGateway>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    if let Err(e) = config.require_streaming() {
        tracing::warn!(error = %e, "Gateway is not fully configured, stream requests will fail");
    }

    let app = create_router(gateway, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
