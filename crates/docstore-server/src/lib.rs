//! HTTP server for docstore.
//!
//! Exposes `POST /file` (multipart upload), `GET /file/:id` (download as an
//! attachment) and `GET /health` over a [`DocumentService`].
//!
//! [`DocumentService`]: docstore_core::DocumentService

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{RegistryBackend, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::AppState;
pub use server::{build_service, DocstoreServer};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use docstore_core::DocumentService;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "docstore-test-boundary";
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n', 0, 0, 0, 13];

    fn app_with_limit(limit: usize) -> Router {
        let config = ServerConfig {
            max_upload_size: limit,
            ..ServerConfig::default()
        };
        DocstoreServer::with_service(config, Arc::new(DocumentService::in_memory())).router()
    }

    fn app() -> Router {
        app_with_limit(ServerConfig::default().max_upload_size)
    }

    fn multipart_body(id: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(id) = id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"Id\"\r\n\r\n{id}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploadFile\"; \
                     filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(id: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(id, file)))
            .unwrap()
    }

    fn get_request(id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/file/{id}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, headers, body)
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, _, body) = send(
            &app(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn upload_and_download_flow() {
        let app = app();

        let (status, _, body) =
            send(&app, upload_request(Some("1"), Some(("a.txt", b"hello".as_slice())))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json(&body)["message"], "File stored successfully");

        let (status, headers, body) = send(&app, get_request("1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hello");
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=a.txt"
        );

        let (status, _, body) =
            send(&app, upload_request(Some("1"), Some(("b.txt", b"again".as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "path with id 1 already exists");

        let (status, _, body) = send(&app, get_request("2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "path with id 2 not found");
    }

    #[tokio::test]
    async fn png_download_is_sniffed() {
        let app = app();
        let (status, _, _) = send(&app, upload_request(Some("7"), Some(("pic.png", PNG)))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, headers, body) = send(&app, get_request("7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(body, PNG);
    }

    #[tokio::test]
    async fn malformed_download_id() {
        let (status, _, body) = send(&app(), get_request("abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "id param type is invalid");
    }

    #[tokio::test]
    async fn non_integer_upload_id() {
        let (status, _, body) =
            send(&app(), upload_request(Some("one"), Some(("a.txt", b"x".as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "Id must be an integer.");

        let (status, _, _) = send(&app(), upload_request(None, Some(("a.txt", b"x".as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_file_part() {
        let (status, _, body) = send(&app(), upload_request(Some("3"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "could not read uploaded file.");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_storing() {
        let app = app_with_limit(4096);
        let big = vec![b'a'; 8192];

        let (status, _, body) = send(&app, upload_request(Some("5"), Some(("big.txt", big.as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&body)["error"],
            "The uploaded file is too big. Maximum file size is 4096 bytes."
        );

        let (status, _, _) = send(&app, get_request("5")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_upload_message_at_default_limit() {
        let big = vec![b'a'; 10 * 1024 * 1024 + 1];
        let (status, _, body) = send(&app(), upload_request(Some("6"), Some(("big.bin", big.as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&body)["error"],
            "The uploaded file is too big. Maximum file size is 10MB."
        );
    }

    #[tokio::test]
    async fn request_id_is_propagated() {
        let (_, headers, _) = send(
            &app(),
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(headers["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn request_id_is_generated() {
        let (_, headers, _) = send(
            &app(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert!(headers.contains_key("x-request-id"));
    }
}
