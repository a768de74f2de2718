//! HTTP Module
//!
//! The transport surface of clipvault: an axum router exposing the three
//! clipboard operations, plus request logging and CORS middleware. This
//! layer is deliberately thin - it resolves payloads, feeds the codec and
//! the store, and translates outcomes into status codes.
//!
//! ```text
//! POST /copy    ──> ingest::resolver ──> codec::Compressor ──> store.put
//! GET  /paste   ──> store.get ──> codec::decompress ──> response body
//! POST /delete  ──> store.delete
//! ```
//!
//! The store handle travels in [`AppState`]; there is no ambient global.

pub mod handlers;
pub mod middleware;

use crate::storage::ClipboardStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The one store instance behind all three routes
    pub store: Arc<ClipboardStore>,
}

/// Builds the application router.
///
/// Body size is uncapped: the service intentionally accepts payloads of any
/// size and bounds nothing but the inactivity window.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/copy", post(handlers::copy))
        .route("/paste", get(handlers::paste))
        .route("/delete", post(handlers::delete))
        .layer(DefaultBodyLimit::disable())
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(axum::middleware::from_fn(middleware::permissive_cors))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
    use axum::http::{Method, Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-CLIPVAULT-TEST-BOUNDARY";

    fn test_router() -> Router {
        router_with_window(Duration::from_secs(60))
    }

    fn router_with_window(window: Duration) -> Router {
        let store = Arc::new(ClipboardStore::with_window(window));
        build_router(AppState { store })
    }

    async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_of(response: Response<Body>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    async fn id_from(response: Response<Body>) -> String {
        let body: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    fn copy_via_query(data: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/copy?data={}", data))
            .body(Body::empty())
            .unwrap()
    }

    fn paste_request(id: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(format!("/paste?id={}", id))
            .body(Body::empty())
            .unwrap()
    }

    fn delete_request(id: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/delete?id={}", id))
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_field_request(value: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{value}\r\n--{b}--\r\n",
            b = BOUNDARY,
        );
        multipart_request(body)
    }

    fn multipart_file_request(contents: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"data\"; filename=\"upload.txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{contents}\r\n--{b}--\r\n",
            b = BOUNDARY,
        );
        multipart_request(body)
    }

    fn multipart_request(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/copy")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_copy_paste_via_query_param() {
        let router = test_router();

        let response = send(&router, copy_via_query("hello")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = id_from(response).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&body_of(response).await[..], b"hello");
    }

    #[tokio::test]
    async fn test_copy_via_json_body() {
        let router = test_router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/copy")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data": "from json"}"#))
            .unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = id_from(response).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(&body_of(response).await[..], b"from json");
    }

    #[tokio::test]
    async fn test_copy_structured_json_value_canonicalized() {
        let router = test_router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/copy")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data": {"nested": [1, 2]}}"#))
            .unwrap();
        let id = id_from(send(&router, request).await).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(&body_of(response).await[..], br#"{"nested":[1,2]}"#);
    }

    #[tokio::test]
    async fn test_copy_via_urlencoded_body() {
        let router = test_router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/copy")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("data=from+form"))
            .unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let id = id_from(response).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(&body_of(response).await[..], b"from form");
    }

    #[tokio::test]
    async fn test_all_three_shapes_store_identical_content() {
        let router = test_router();

        let inline_id = id_from(send(&router, copy_via_query("hello")).await).await;
        let field_id = id_from(send(&router, multipart_field_request("hello")).await).await;
        let file_id = id_from(send(&router, multipart_file_request("hello")).await).await;

        for id in [inline_id, field_id, file_id] {
            let response = send(&router, paste_request(&id)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(&body_of(response).await[..], b"hello");
        }
    }

    #[tokio::test]
    async fn test_copy_without_data_is_bad_request() {
        let router = test_router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/copy")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_multipart_without_data_field_is_bad_request() {
        let router = test_router();

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{b}--\r\n",
            b = BOUNDARY,
        );
        let response = send(&router, multipart_request(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_file_roundtrips_to_empty_body() {
        let router = test_router();

        let id = id_from(send(&router, multipart_file_request("")).await).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_paste_unknown_id_is_empty_404() {
        let router = test_router();

        let response = send(&router, paste_request("doesnotexist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let router = test_router();

        let id = id_from(send(&router, copy_via_query("short+lived")).await).await;

        let response = send(&router, delete_request(&id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_of(response).await.is_empty());

        // Gone for both paste and a second delete
        let response = send(&router, paste_request(&id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = send(&router, delete_request(&id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_404() {
        let router = test_router();

        let response = send(&router, delete_request("doesnotexist")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_with_id_in_json_body() {
        let router = test_router();

        let id = id_from(send(&router, copy_via_query("by+body")).await).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/delete")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"id": "{}"}}"#, id)))
            .unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_paste_after_window_lapses_is_404() {
        let router = router_with_window(Duration::from_millis(40));

        let id = id_from(send(&router, copy_via_query("ephemeral")).await).await;

        tokio::time::sleep(Duration::from_millis(70)).await;

        let response = send(&router, paste_request(&id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_carry_cors_headers() {
        let router = test_router();

        let response = send(&router, paste_request("whatever")).await;
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_preflight_is_answered_directly() {
        let router = test_router();

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/copy")
            .body(Body::empty())
            .unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
