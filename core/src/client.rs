//! Request executor.
//!
//! # Design
//! `ApiClient` holds configuration and two injected capabilities: the
//! `Transport` that performs the round-trip and the `ProgressIndicator` it
//! signals around each call. It carries no per-call state, so one client can
//! serve concurrent calls and clones share the same capabilities.
//!
//! A call is linear: show progress, build, transmit, decode, hide. Building
//! (`build_request`) and decoding (`parse_response`) are public and free of
//! I/O. Decoding is attempted whatever the status code; a 500 with a JSON
//! body decodes like a 200, and the status stays visible on the returned
//! `HttpResponse`.

use std::any::type_name;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::{self, encode_multipart, FileUpload, FormValue, Parameters};
use crate::progress::{NoProgress, ProgressGuard, ProgressIndicator};
use crate::transport::Transport;

const CONTENT_TYPE: &str = "Content-Type";

/// Everything needed to issue one call. Built fresh for each call and
/// consumed by it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Absolute, or relative to `ClientConfig::base_url`.
    pub url: String,
    pub method: HttpMethod,
    /// Names are unique, compared case-insensitively. `Content-Type` is
    /// always replaced by the multipart one.
    pub headers: Vec<(String, String)>,
    pub parameters: Option<Parameters>,
    pub files: Option<Vec<FileUpload>>,
    pub show_progress: bool,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            parameters: None,
            files: None,
            show_progress: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).method(HttpMethod::Post)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(url).method(HttpMethod::Put)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(url).method(HttpMethod::Delete)
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets header `name`, overwriting an earlier value of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.parameters
            .get_or_insert_with(Parameters::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, file: FileUpload) -> Self {
        self.files.get_or_insert_with(Vec::new).push(file);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// Result of a successful call: the decoded payload next to the raw
/// response it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// `Some` whenever decoding was attempted; `call_api` always attempts it.
    pub data: Option<T>,
    pub response: HttpResponse,
}

impl<T> ApiResponse<T> {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressIndicator>,
    config: ClientConfig,
}

impl ApiClient {
    /// A client with the default config and no progress indicator.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            progress: Arc::new(NoProgress),
            config: ClientConfig::default(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressIndicator>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `request` and decodes the JSON response body into `T`.
    ///
    /// The progress indicator, when `request.show_progress` is set, is shown
    /// once before anything else happens and hidden once before this returns,
    /// on success and on both failure kinds alike.
    pub async fn call_api<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        let _progress = ProgressGuard::start(self.progress.as_ref(), request.show_progress);

        let response = self.transmit(&request).await?;
        let data = self.parse_response::<T>(&response).inspect_err(|e| {
            let url = self.config.resolve_url(&request.url);
            warn!(%url, status = response.status, error = %e, "response decode failed")
        })?;

        Ok(ApiResponse {
            data: Some(data),
            response,
        })
    }

    /// Same lifecycle as `call_api`, without decoding the body.
    pub async fn send_raw(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let _progress = ProgressGuard::start(self.progress.as_ref(), request.show_progress);
        self.transmit(&request).await
    }

    /// Builds the wire request for `request`, delimiting parts with `boundary`.
    pub fn build_request(&self, request: &ApiRequest, boundary: &str) -> HttpRequest {
        let mut headers = Vec::new();
        for (name, value) in self.config.default_headers.iter().chain(&request.headers) {
            if name.eq_ignore_ascii_case(CONTENT_TYPE) {
                continue;
            }
            set_header(&mut headers, name.clone(), value.clone());
        }
        headers.push((CONTENT_TYPE.to_string(), multipart::content_type(boundary)));

        HttpRequest {
            method: request.method,
            url: self.config.resolve_url(&request.url),
            headers,
            body: encode_multipart(
                request.parameters.as_ref(),
                request.files.as_deref(),
                boundary,
                self.config.closing,
            ),
        }
    }

    /// Decodes `response.body` as JSON into `T`, whatever the status code.
    pub fn parse_response<T: DeserializeOwned>(
        &self,
        response: &HttpResponse,
    ) -> Result<T, ApiError> {
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode {
            type_name: type_name::<T>().to_string(),
            status: response.status,
            message: e.to_string(),
        })
    }

    async fn transmit(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError> {
        let boundary = multipart::new_boundary();
        let http_request = self.build_request(request, &boundary);
        debug!(
            method = %http_request.method,
            url = %http_request.url,
            %boundary,
            bytes = http_request.body.len(),
            "sending multipart request"
        );

        let url = http_request.url.clone();
        let response = self.transport.send(http_request).await.map_err(|e| {
            warn!(%url, error = %e, "transport failed");
            ApiError::from(e)
        })?;
        debug!(%url, status = response.status, "response received");
        Ok(response)
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
    {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}
