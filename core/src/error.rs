//! Error types for the request helper.
//!
//! # Design
//! Callers see two kinds of failure from a call: the transport could not
//! complete the round-trip, or the response body did not decode into the
//! requested type. Transport errors are wrapped transparently so the
//! underlying error reaches the caller unchanged. HTTP status codes are not
//! errors here; a non-2xx response is still decoded.

use thiserror::Error as ThisError;

/// Failure reported by a `Transport` while sending a request.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TransportError {
    /// The peer could not be reached: refused, reset, DNS or socket I/O.
    #[error("connection to '{url}' failed: {message}")]
    Connection { url: String, message: String },

    /// The request was rejected before anything was sent, e.g. a malformed
    /// URL or header.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport failed: {0}")]
    Other(String),
}

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body is not JSON, or not JSON of the expected shape.
    #[error("unable to JSON decode HTTP {status} response body into type `{type_name}`: {message}")]
    Decode {
        type_name: String,
        status: u16,
        message: String,
    },
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("invalid closing delimiter '{0}', expected 'legacy' or 'standard'")]
    InvalidClosingDelimiter(String),
}
