use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, ErrorBody, UploadSummary};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn multipart_request(boundary: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/echo")
                .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
                .header("x-trace", "abc")
                .body(Body::from("--B\r\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.content_type.as_deref(), Some("multipart/form-data; boundary=B"));
    assert_eq!(echo.body, "--B\r\n");
    assert_eq!(echo.body_len, 5);
    assert_eq!(echo.headers.get("x-trace").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn echo_accepts_get_with_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/echo")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.body, "payload");
    assert!(echo.content_type.is_none());
}

// --- upload ---

#[tokio::test]
async fn upload_lists_parts_in_order() {
    let mut body = Vec::new();
    body.extend_from_slice(
        b"--B\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n",
    );
    body.extend_from_slice(
        b"--B\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(&[0xff, 0x00, 0x01]);
    body.extend_from_slice(b"\r\n--B--\r\n");

    let resp = app().oneshot(multipart_request("B", body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let summary: UploadSummary = body_json(resp).await;
    assert_eq!(summary.parts.len(), 2);

    let title = &summary.parts[0];
    assert_eq!(title.name, "title");
    assert!(title.file_name.is_none());
    assert_eq!(title.text.as_deref(), Some("hello"));

    let avatar = &summary.parts[1];
    assert_eq!(avatar.name, "avatar");
    assert_eq!(avatar.file_name.as_deref(), Some("a.png"));
    assert_eq!(avatar.content_type.as_deref(), Some("image/png"));
    assert_eq!(avatar.size, 3);
    assert!(avatar.text.is_none(), "0xff is not UTF-8");
}

#[tokio::test]
async fn upload_without_multipart_content_type_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn upload_rejects_get() {
    let resp = app()
        .oneshot(Request::builder().uri("/upload").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- status ---

#[tokio::test]
async fn plain_status_returns_non_json_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/status/500")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..], b"internal error");
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn json_status_returns_error_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/json-status/404")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.code, 404);
    assert_eq!(body.error, "Not Found");
}

#[tokio::test]
async fn invalid_status_code_returns_400() {
    for uri in ["/status/42", "/status/abc"] {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

// --- blob ---

#[tokio::test]
async fn blob_returns_json_string_of_requested_length() {
    let resp = app()
        .oneshot(Request::builder().uri("/blob/5").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let text: String = body_json(resp).await;
    assert_eq!(text, "aaaaa");
}
