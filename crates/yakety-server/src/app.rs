//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::live_reload;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `static_dir` - Directory served for every unmatched path
pub(crate) fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/api/hello", get(handlers::hello::get_hello))
        .route("/api/health", get(handlers::health::get_health));

    let mut router = Router::new()
        .merge(api_routes)
        .route("/live-reload.js", get(live_reload::script_handler));

    // WebSocket for live reload
    if state.live_reload_enabled() {
        router = router.route(live_reload::ENDPOINT, get(live_reload::ws_handler));
    }

    router = router.merge(static_files::static_router(static_dir));

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, Instant};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use yakety_watch::MockChangeSource;

    use crate::live_reload::LiveReloadManager;
    use crate::{ServerConfig, build_state};

    fn state(live_reload: Option<LiveReloadManager>, dev: bool) -> Arc<AppState> {
        Arc::new(AppState {
            live_reload,
            dev,
            client_port: 3333,
            started_at: Instant::now(),
        })
    }

    fn ws_request() -> Request<Body> {
        Request::builder()
            .uri("/ws/live-reload")
            .header(header::CONNECTION, "upgrade")
            .header(header::UPGRADE, "websocket")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
            .body(Body::empty())
            .unwrap()
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_endpoint_absent_without_dev() {
        let dir = TempDir::new().unwrap();
        let source = MockChangeSource::new(dir.path());
        let config = ServerConfig {
            dev: false,
            watch_root: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let router = create_router(build_state(&config, &source), dir.path());

        let response = router.oneshot(ws_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(source.subscribe_calls(), 0);
    }

    #[tokio::test]
    async fn test_endpoint_absent_when_watch_fails() {
        let dir = TempDir::new().unwrap();
        let source = MockChangeSource::new(dir.path()).failing();
        let config = ServerConfig {
            dev: true,
            watch_root: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let router = create_router(build_state(&config, &source), dir.path());

        let response = router.clone().oneshot(ws_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(source.subscribe_calls(), 1);

        // The rest of the server keeps working
        let health = router.oneshot(request("/api/health")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_endpoint_present_with_live_reload() {
        let dir = TempDir::new().unwrap();
        let source = MockChangeSource::new(dir.path());
        let manager = LiveReloadManager::start(&source, Duration::ZERO).unwrap();
        let router = create_router(state(Some(manager), true), dir.path());

        let response = router.oneshot(ws_request()).await.unwrap();

        assert_ne!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(source.subscribe_calls(), 1);
    }

    #[tokio::test]
    async fn test_hello() {
        let dir = TempDir::new().unwrap();
        let router = create_router(state(None, true), dir.path());

        let response = router.oneshot(request("/api/hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Hello world from Yakety!");
        assert_eq!(json["environment"], "development");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let router = create_router(state(None, false), dir.path());

        let response = router.oneshot(request("/api/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_script_served_without_cache() {
        let dir = TempDir::new().unwrap();
        let router = create_router(state(None, false), dir.path());

        let response = router.oneshot(request("/live-reload.js")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let script = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(script.contains(":3333/ws/live-reload"));
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Yakety</h1>").unwrap();
        let router = create_router(state(None, false), dir.path());

        let response = router.clone().oneshot(request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>Yakety</h1>");

        let missing = router.oneshot(request("/nope.css")).await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
