//! OpenAPI documentation and schema generation
//!
//! Generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the nzb-stream REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "nzb-stream REST API",
        version = "0.1.0",
        description = "Streaming gateway turning Usenet download jobs into seekable HTTP media streams",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:7000", description = "Local gateway")
    ),
    paths(
        // Streaming
        crate::api::routes::stream,

        // Cache
        crate::api::routes::cache_stats,
        crate::api::routes::clear_cache,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::gateway::StreamRequest,
        crate::types::CacheStats,
        crate::types::ResolvedStream,
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::RequestedEpisode,
        crate::api::routes::CacheCleared,

        crate::config::Config,
        crate::config::ManagerConfig,
        crate::config::ShareConfig,
        crate::config::PollConfig,
        crate::config::LocatorConfig,
        crate::config::CacheConfig,
        crate::config::FallbackConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "stream", description = "Resolve NZB downloads and stream the resulting video with Range support"),
        (name = "cache", description = "Stream resolution cache - inspect and clear memoized resolutions"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the two ways of passing the API key
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key"))),
            );
            components.add_security_scheme(
                "api_key_query",
                SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("apikey"))),
            );
        }
    }
}
