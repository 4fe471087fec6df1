//! Cache handlers: stats and clear.

use super::CacheCleared;
use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /cache - Counts of cached resolutions by state
#[utoipa::path(
    get,
    path = "/cache",
    tag = "cache",
    responses(
        (status = 200, description = "Cache entry counts", body = crate::types::CacheStats)
    )
)]
pub async fn cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.gateway.cache_stats().await)
}

/// DELETE /cache - Forget every resolution, including failed jobs
#[utoipa::path(
    delete,
    path = "/cache",
    tag = "cache",
    responses(
        (status = 200, description = "Cache cleared", body = CacheCleared)
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    let cleared = state.gateway.clear_cache().await;
    Json(CacheCleared { cleared })
}
