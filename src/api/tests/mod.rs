use super::*;
use crate::error::ApiError;
use crate::gateway::StreamGateway;
use crate::share::WebDavShare;
use crate::test_helpers::{HistoryStep, ScriptedManager, streaming_config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::io::Write;
use tempfile::TempDir;
use tower::ServiceExt;


/// Build a router over a scripted manager
fn test_router(config: Config, manager: Arc<ScriptedManager>) -> (Router, Arc<StreamGateway>) {
    let share = Arc::new(WebDavShare::new(&config.share).unwrap());
    let gateway = Arc::new(StreamGateway::with_parts(config.clone(), manager, share));
    let router = create_router(gateway.clone(), Arc::new(config));
    (router, gateway)
}

/// Config whose failure indicator is a 1000-byte file in `dir`
fn config_with_fallback(dir: &TempDir) -> Config {
    let path = dir.path().join("stream-failed.mp4");
    let bytes: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    std::fs::File::create(&path)
        .unwrap()
        .write_all(&bytes)
        .unwrap();

    let mut config = streaming_config();
    config.fallback.asset_path = path;
    config
}

fn failing_manager(reason: &'static str) -> Arc<ScriptedManager> {
    Arc::new(
        ScriptedManager::new("nzo_failed", "Broken.Movie")
            .with_history(vec![HistoryStep::Failed(reason)]),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn api_error(response: axum::response::Response) -> ApiError {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_server_stops_on_shutdown_signal() {
    let mut config = streaming_config();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let manager = Arc::new(ScriptedManager::new("nzo_1", "Movie"));
    let share = Arc::new(WebDavShare::new(&config.share).unwrap());
    let gateway = Arc::new(StreamGateway::with_parts(config.clone(), manager, share));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(gateway, Arc::new(config), async {
        let _ = rx.await;
    }));

    tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_server_reports_bind_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = streaming_config();
    config.server.api.bind_address = listener.local_addr().unwrap();
    let manager = Arc::new(ScriptedManager::new("nzo_1", "Movie"));
    let share = Arc::new(WebDavShare::new(&config.share).unwrap());
    let gateway = Arc::new(StreamGateway::with_parts(config.clone(), manager, share));

    let result = serve_with_shutdown(gateway, Arc::new(config), async {}).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}
