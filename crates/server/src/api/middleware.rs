//! Metrics middleware for API routes.

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response,
};
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Records duration, count and in-flight gauge for every request.
///
/// Requests are labelled with the matched route template; unmatched
/// requests fall back to the raw path with ids collapsed.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => normalize_path(request.uri().path()),
    };

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let app = Router::new()
            .route("/api/v1/users/{id}/things", get(dummy_handler))
            .layer(middleware::from_fn(metrics_middleware));

        let request = Request::builder()
            .uri("/api/v1/users/77/things")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let count = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/api/v1/users/{id}/things", "200"])
            .get();
        assert!(count >= 1);
    }

    #[tokio::test]
    async fn test_unmatched_path_is_normalized() {
        let app = Router::new()
            .route("/known", get(dummy_handler))
            .layer(middleware::from_fn(metrics_middleware));

        let request = Request::builder()
            .uri("/unknown/12345")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let count = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/unknown/{id}", "404"])
            .get();
        assert!(count >= 1);
    }
}
