//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - `stream` - Stream resolution and byte serving
//! - `cache` - Resolution cache inspection
//! - `system` - Health and OpenAPI

use serde::{Deserialize, Serialize};

mod cache;
mod stream;
mod system;

pub use cache::*;
pub use stream::*;
pub use system::*;

/// Response body for DELETE /cache
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CacheCleared {
    /// Number of entries dropped
    pub cleared: usize,
}
