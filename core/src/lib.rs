//! Multipart-form HTTP request helper.
//!
//! # Overview
//! `ApiClient` sends one request per call: scalar parameters and file
//! attachments are encoded as a `multipart/form-data` body, the request goes
//! out through an injected `Transport`, and the JSON response is decoded into
//! a caller-chosen type. A `ProgressIndicator` is shown for the duration of
//! the call and hidden again on every exit path.
//!
//! # Design
//! - `ApiClient` holds only configuration plus two capabilities (transport,
//!   progress). There is no process-wide instance; construct as many as needed.
//! - Building (`build_request`) and decoding (`parse_response`) are pure and
//!   public, so the I/O boundary stays explicit and testable.
//! - The encoder (`multipart`) is a free function over borrowed inputs.
//! - `UreqTransport` is the bundled transport; tests swap in fakes.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod progress;
pub mod transport;

pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use config::{ClientConfig, ClosingDelimiter};
pub use error::{ApiError, ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{encode_multipart, FileUpload, FormValue, Parameters};
pub use progress::{NoProgress, ProgressGuard, ProgressIndicator, SharedProgress};
pub use transport::{Transport, UreqTransport};
