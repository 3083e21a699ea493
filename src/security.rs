//! HTTP hardening: security headers and CORS.

use axum::{
    extract::Request,
    http::{
        HeaderValue, Method,
        header::{
            AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Add headers that stop browsers from sniffing content types, framing
/// responses or leaking the referrer.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    response
}

/// Build the CORS layer.
///
/// With a `client_url` only that origin may make cross-origin requests and
/// other origins get no `Access-Control-Allow-Origin` header, otherwise any
/// origin may. An origin that is not a valid header value allows
/// no cross-origin requests at all.
pub fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let Some(client_url) = client_url else {
        return CorsLayer::permissive();
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(client_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(error) => {
            tracing::error!(
                "Invalid client URL {client_url:?}, blocking cross-origin requests: {error}"
            );
            cors
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::Method, middleware, routing::get};
    use axum_test::TestServer;

    use super::{cors_layer, security_headers};

    fn get_test_server(client_url: Option<&str>) -> TestServer {
        let app = Router::new()
            .route("/", get(|| async { "hello" }))
            .layer(middleware::from_fn(security_headers))
            .layer(cors_layer(client_url));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn adds_security_headers() {
        let server = get_test_server(None);

        let response = server.get("/").await;

        response.assert_status_ok();
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("referrer-policy"), "no-referrer");
    }

    #[tokio::test]
    async fn allows_configured_origin() {
        let server = get_test_server(Some("http://localhost:3000/"));

        let response = server
            .get("/")
            .add_header("Origin", "http://localhost:3000")
            .await;

        assert_eq!(
            response.header("access-control-allow-origin"),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn other_origins_get_no_cors_header() {
        let server = get_test_server(Some("http://localhost:3000"));

        let response = server
            .get("/")
            .add_header("Origin", "http://evil.example")
            .await;

        assert!(
            response
                .headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }

    #[tokio::test]
    async fn preflight_from_configured_origin_is_allowed() {
        let server = get_test_server(Some("http://localhost:3000"));

        let response = server
            .method(Method::OPTIONS, "/")
            .add_header("Origin", "http://localhost:3000")
            .add_header("Access-Control-Request-Method", "PUT")
            .await;

        assert_eq!(
            response.header("access-control-allow-origin"),
            "http://localhost:3000"
        );
    }
}
