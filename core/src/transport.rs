//! Transport capability: sends an `HttpRequest` and hands back the raw
//! `HttpResponse`.
//!
//! # Design
//! `ApiClient` never touches the network itself. Anything implementing
//! `Transport` can carry the request: the bundled `UreqTransport`, or a fake
//! in tests. A transport reports only failures to complete the round-trip;
//! any status code the server answers with is returned as data.

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking `ureq` agent driven from `tokio::task::spawn_blocking`.
///
/// The agent has `http_status_as_error` turned off so 4xx/5xx responses come
/// back as data and the caller decides what a status means.
///
/// Response bodies are read in full with no size cap unless one is set with
/// `with_body_limit`. Going over the cap is a `TransportError::Other`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Uses a caller-configured agent as is. Keep `http_status_as_error`
    /// disabled on it, or error statuses surface as `TransportError`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }

    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        tokio::task::spawn_blocking(move || send_blocking(&agent, body_limit, request))
            .await
            .map_err(|e| TransportError::Other(format!("blocking send task failed: {e}")))?
    }
}

fn send_blocking(
    agent: &ureq::Agent,
    body_limit: u64,
    request: HttpRequest,
) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    // GET and DELETE carry the multipart body too.
    let mut builder = match method {
        HttpMethod::Get => agent.get(&url).force_send_body(),
        HttpMethod::Delete => agent.delete(&url).force_send_body(),
        HttpMethod::Post => agent.post(&url),
        HttpMethod::Put => agent.put(&url),
    };
    for (name, value) in &headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let mut response = builder
        .send(body.as_slice())
        .map_err(|e| map_ureq_error(&url, e))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    // ureq caps `read_to_vec` at 10 MiB unless told otherwise.
    let body = response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
        .map_err(|e| map_ureq_error(&url, e))?;

    debug!(%url, status, bytes = body.len(), "ureq round-trip finished");
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn map_ureq_error(url: &str, error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
            TransportError::Connection {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
        ureq::Error::Http(_) | ureq::Error::BadUri(_) => {
            TransportError::InvalidRequest(error.to_string())
        }
        other => TransportError::Other(other.to_string()),
    }
}
