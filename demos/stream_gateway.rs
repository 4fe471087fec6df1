//! Streaming gateway example
//!
//! Runs the gateway in front of a SABnzbd-compatible download manager and the WebDAV
//! share it writes completed jobs to.
//!
//! Environment:
//! - `SABNZBD_URL` / `SABNZBD_API_KEY` - download manager (default: http://localhost:8080)
//! - `WEBDAV_URL` - file share (default: http://localhost:3000)
//! - `WEBDAV_USER` / `WEBDAV_PASSWORD` - optional basic auth for the share
//!
//! After starting, point a media player at:
//! http://localhost:7000/stream?downloadUrl=<nzb url>&contentType=movie&title=<title>

use nzb_stream::config::{ApiConfig, Config, ManagerConfig, ServerIntegrationConfig, ShareConfig};
use nzb_stream::{StreamGateway, run_with_shutdown};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    let config = Config {
        manager: ManagerConfig {
            base_url: Some(env("SABNZBD_URL").unwrap_or_else(|| "http://localhost:8080".into())),
            api_key: env("SABNZBD_API_KEY"),
            ..Default::default()
        },
        share: ShareConfig {
            url: Some(env("WEBDAV_URL").unwrap_or_else(|| "http://localhost:3000".into())),
            username: env("WEBDAV_USER"),
            password: env("WEBDAV_PASSWORD"),
            ..Default::default()
        },
        server: ServerIntegrationConfig {
            api: ApiConfig {
                bind_address: "127.0.0.1:7000".parse::<SocketAddr>()?,
                api_key: None, // No authentication for local use
                swagger_ui: true,
            },
        },
        ..Default::default()
    };

    if let Err(e) = config.require_streaming() {
        eprintln!("Gateway is not fully configured: {e}");
    }

    let gateway = Arc::new(StreamGateway::new(config)?);

    println!("Starting nzb-stream gateway");
    println!("Swagger UI: http://localhost:7000/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  # Resolve and fetch the first megabyte of a movie");
    println!("  curl -r 0-1048575 -o /dev/null -D - \\");
    println!("    'http://localhost:7000/stream?downloadUrl=https%3A%2F%2Findexer%2Fget%2F1.nzb&contentType=movie'");
    println!();
    println!("  # Inspect and clear the resolution cache");
    println!("  curl http://localhost:7000/cache");
    println!("  curl -X DELETE http://localhost:7000/cache");

    // Serve until SIGINT/SIGTERM
    run_with_shutdown(gateway).await?;

    Ok(())
}
