//! `multipart/form-data` body encoder.
//!
//! # Design
//! The encoder is a pure function of its inputs: the caller supplies the
//! boundary, so the output is fully deterministic and fixtures can pin it
//! byte for byte. Parameters live in a `BTreeMap` and are therefore emitted
//! in ascending key order; files keep the order they were given in.
//!
//! Nothing is escaped. A parameter value, file name or payload that contains
//! the boundary string or stray quotes/CRLFs will corrupt the framing. Fresh
//! UUID boundaries make an accidental collision vanishingly unlikely.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::config::ClosingDelimiter;

/// Form fields sent as plain-text parts, keyed by field name.
pub type Parameters = BTreeMap<String, FormValue>;

/// A scalar form field value. Encoded with its `Display` rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Text(text) => f.write_str(text),
            FormValue::Int(n) => write!(f, "{n}"),
            FormValue::UInt(n) => write!(f, "{n}"),
            FormValue::Float(n) => write!(f, "{n}"),
            FormValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<i32> for FormValue {
    fn from(value: i32) -> Self {
        FormValue::Int(value.into())
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Int(value)
    }
}

impl From<u32> for FormValue {
    fn from(value: u32) -> Self {
        FormValue::UInt(value.into())
    }
}

impl From<u64> for FormValue {
    fn from(value: u64) -> Self {
        FormValue::UInt(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Float(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

/// A file attachment sent as its own part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Form field name.
    pub name: String,
    /// Value of the `filename` parameter in `Content-Disposition`.
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// A fresh boundary token. Never reuse one across requests.
pub fn new_boundary() -> String {
    Uuid::new_v4().to_string()
}

/// `Content-Type` header value announcing `boundary`.
pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Encodes `parameters` then `files` as a multipart body delimited by
/// `boundary`, terminated according to `closing`.
///
/// Absent inputs contribute no parts; with neither, the body is only the
/// closing delimiter.
pub fn encode_multipart(
    parameters: Option<&Parameters>,
    files: Option<&[FileUpload]>,
    boundary: &str,
    closing: ClosingDelimiter,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (key, value) in parameters.into_iter().flatten() {
        write_parameter_part(&mut body, key, value, boundary);
    }

    for file in files.into_iter().flatten() {
        write_file_part(&mut body, file, boundary);
    }

    match closing {
        ClosingDelimiter::Legacy => body.extend_from_slice(format!("--{boundary}\r\n").as_bytes()),
        ClosingDelimiter::Standard => {
            body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes())
        }
    }

    body
}

fn write_parameter_part(body: &mut Vec<u8>, key: &str, value: &FormValue, boundary: &str) {
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{key}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("{value}\r\n").as_bytes());
}

fn write_file_part(body: &mut Vec<u8>, file: &FileUpload, boundary: &str) {
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            file.name, file.file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
    body.extend_from_slice(&file.data);
    body.extend_from_slice(b"\r\n");
}
