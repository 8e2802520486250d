use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

/// What `/echo` saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub body_len: usize,
    /// Body decoded as lossy UTF-8.
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    /// Part content when it is valid UTF-8.
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadSummary {
    pub parts: Vec<UploadedPart>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/upload", post(upload))
        .route("/status/{code}", any(plain_status))
        .route("/json-status/{code}", any(json_status))
        .route("/blob/{len}", any(blob))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    debug!(%method, bytes = body.len(), "echo");

    Json(Echo {
        method: method.to_string(),
        content_type,
        body_len: body.len(),
        body: String::from_utf8_lossy(&body).into_owned(),
        headers,
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<UploadSummary>, MultipartError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        parts.push(UploadedPart {
            name,
            file_name,
            content_type,
            size: data.len(),
            text: String::from_utf8(data.to_vec()).ok(),
        });
    }
    debug!(parts = parts.len(), "upload");
    Ok(Json(UploadSummary { parts }))
}

fn status_from(code: u16) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}

async fn plain_status(Path(code): Path<u16>) -> Result<(StatusCode, &'static str), StatusCode> {
    let status = status_from(code)?;
    Ok((status, "internal error"))
}

async fn json_status(Path(code): Path<u16>) -> Result<(StatusCode, Json<ErrorBody>), StatusCode> {
    let status = status_from(code)?;
    let error = status
        .canonical_reason()
        .unwrap_or("unknown")
        .to_string();
    Ok((status, Json(ErrorBody { error, code })))
}

/// A JSON string of `len` ASCII letters, for large-body tests.
async fn blob(Path(len): Path<usize>) -> Json<String> {
    debug!(len, "blob");
    Json("a".repeat(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_serializes_to_json() {
        let body = ErrorBody {
            error: "Internal Server Error".to_string(),
            code: 500,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Internal Server Error");
        assert_eq!(json["code"], 500);
    }

    #[test]
    fn uploaded_part_allows_missing_optionals() {
        let raw =
            r#"{"name":"title","file_name":null,"content_type":null,"size":5,"text":"hello"}"#;
        let part: UploadedPart = serde_json::from_str(raw).unwrap();
        assert_eq!(part.name, "title");
        assert!(part.file_name.is_none());
        assert_eq!(part.text.as_deref(), Some("hello"));
    }

    #[test]
    fn out_of_range_status_is_bad_request() {
        assert_eq!(status_from(42), Err(StatusCode::BAD_REQUEST));
        assert_eq!(status_from(503), Ok(StatusCode::SERVICE_UNAVAILABLE));
    }
}
