//! Application state for the API server

use crate::Config;
use crate::gateway::StreamGateway;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (Arc clones only).
#[derive(Clone)]
pub struct AppState {
    /// Streaming gateway answering `/stream` and owning the resolution cache
    pub gateway: Arc<StreamGateway>,

    /// Configuration, read-only
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(gateway: Arc<StreamGateway>, config: Arc<Config>) -> Self {
        Self { gateway, config }
    }
}
