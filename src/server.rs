//! Static file server for generated products.
//!
//! Every response carries permissive cross-origin headers so browser map
//! clients on other origins can fetch the GeoTIFFs directly. No
//! authentication.

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use std::path::Path;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

use crate::error::{Result, SwradError};
use crate::logging::create_http_trace_layer;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Build the router serving `directory`
pub fn router(directory: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback_service(ServeDir::new(directory))
        .layer(create_http_trace_layer())
        .layer(cors)
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            ALLOW_ORIGIN,
        ))
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            ALLOW_METHODS,
        ))
        .layer(cors_header(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            ALLOW_HEADERS,
        ))
}

fn cors_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Serve `directory` until Ctrl+C or SIGTERM
pub async fn serve(directory: &Path, host: &str, port: u16) -> Result<()> {
    if !directory.is_dir() {
        return Err(SwradError::Server {
            message: format!("Not a directory: {}", directory.display()),
        });
    }

    let app = router(directory);

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| SwradError::Server {
            message: format!("Failed to bind to {}:{}: {}", host, port, e),
        })?;

    info!(
        directory = %directory.display(),
        "Serving on http://{}:{}",
        host,
        port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SwradError::Server {
            message: format!("Server error: {}", e),
        })?;

    info!("Server has been gracefully shut down");
    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn assert_cors_headers(headers: &axum::http::HeaderMap) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn test_serves_file_with_cors_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("swrad_202407071200_jet.tif"), b"tiff").unwrap();

        let response = router(dir.path())
            .oneshot(
                Request::builder()
                    .uri("/swrad_202407071200_jet.tif")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(response.headers());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"tiff");
    }

    #[tokio::test]
    async fn test_missing_file_still_has_cors_headers() {
        let dir = tempfile::tempdir().unwrap();

        let response = router(dir.path())
            .oneshot(Request::builder().uri("/absent.tif").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_cors_headers(response.headers());
    }

    #[tokio::test]
    async fn test_preflight_request() {
        let dir = tempfile::tempdir().unwrap();

        let response = router(dir.path())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything.tif")
                    .header(header::ORIGIN, "http://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_cors_headers(response.headers());
    }

    #[tokio::test]
    async fn test_serve_rejects_missing_directory() {
        let result = serve(Path::new("/nonexistent/products"), "127.0.0.1", 0).await;
        assert!(matches!(result, Err(SwradError::Server { .. })));
    }
}
