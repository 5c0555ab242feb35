//! Plastiscan Web Server
//!
//! Axum-based server exposing the image analysis endpoint.

pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use plastiscan_core::config::ServerConfig;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Build the CORS layer applied to `/api`.
pub fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {}", origin))?,
        ),
        None => AllowOrigin::any(),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Create the application router.
pub fn create_router(state: AppState, config: &ServerConfig) -> anyhow::Result<Router> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;

    let api_routes = Router::new()
        .route("/analyze-image", post(routes::analyze::analyze_image))
        .route("/analyze", post(routes::analyze::describe_image))
        .route("/health", get(routes::health::get_health))
        .layer(cors)
        .with_state(state);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http()))
}

/// Run the web server until Ctrl+C.
pub async fn run_server(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_router(state, config)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[test]
    fn test_cors_layer_rejects_bad_origin() {
        assert!(super::cors_layer(Some("https://example.com")).is_ok());
        assert!(super::cors_layer(Some("bad\norigin")).is_err());
        assert!(super::cors_layer(None).is_ok());
    }

    #[tokio::test]
    async fn test_preflight_allows_configured_origin() {
        use plastiscan_core::config::ServerConfig;
        use plastiscan_core::Analyzer;
        use std::sync::Arc;

        let config = ServerConfig {
            allowed_origin: Some("https://scan.example.com".to_string()),
            ..ServerConfig::default()
        };
        let model = Arc::new(StubModel(Ok("{}".to_string())));
        let state = crate::state::AppState::new(Analyzer::new(model, true));
        let router = crate::create_router(state, &config).unwrap();

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/analyze-image")
            .header("origin", "https://scan.example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://scan.example.com"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let response = router(Ok("{}"), true).oneshot(request).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
