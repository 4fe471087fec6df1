//! Gateway configuration pointed at mock collaborators

use std::path::Path;
use std::time::Duration;
use nzb_stream::Config;
use wiremock::MockServer;

/// Config talking to a mock manager and a mock share, with fast polling
pub fn gateway_config(manager: &MockServer, share: &MockServer, fallback_asset: &Path) -> Config {
    let mut config = Config::default();
    config.manager.base_url = Some(manager.uri());
    config.manager.api_key = Some("e2e-key".to_string());
    config.share.url = Some(share.uri());
    config.poll.interval = Duration::from_millis(100);
    config.poll.deadline = Duration::from_secs(5);
    config.fallback.asset_path = fallback_asset.to_path_buf();
    config
}
