//! Client configuration.
//!
//! Every field has a default, so `ClientConfig::default()` works out of the
//! box and a partial JSON document deserializes cleanly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "FORMPOST_BASE_URL";
pub const ENV_CLOSING_DELIMITER: &str = "FORMPOST_CLOSING_DELIMITER";

/// How the multipart body is terminated.
///
/// `Legacy` emits `--{boundary}\r\n`, which is what deployed backends of this
/// client have always received. `Standard` emits the RFC 7578 form
/// `--{boundary}--\r\n` for servers that parse strictly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosingDelimiter {
    #[default]
    Legacy,
    Standard,
}

impl ClosingDelimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosingDelimiter::Legacy => "legacy",
            ClosingDelimiter::Standard => "standard",
        }
    }
}

impl fmt::Display for ClosingDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClosingDelimiter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ClosingDelimiter::Legacy),
            "standard" => Ok(ClosingDelimiter::Standard),
            _ => Err(ConfigError::InvalidClosingDelimiter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for relative request URLs. Absolute URLs ignore it.
    pub base_url: Option<String>,
    pub closing: ClosingDelimiter,
    /// Sent with every request; per-request headers of the same name win.
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Reads `FORMPOST_BASE_URL` and `FORMPOST_CLOSING_DELIMITER`. Unset
    /// variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty());
        let closing = match lookup(ENV_CLOSING_DELIMITER) {
            Some(raw) => raw.parse()?,
            None => ClosingDelimiter::default(),
        };
        Ok(Self {
            base_url,
            closing,
            default_headers: Vec::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_closing(mut self, closing: ClosingDelimiter) -> Self {
        self.closing = closing;
        self
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Joins a relative `url` onto `base_url`. Anything with a scheme, or any
    /// URL when no base is configured, is returned as given.
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                let base = base.trim_end_matches('/');
                let path = url.trim_start_matches('/');
                if path.is_empty() {
                    base.to_string()
                } else {
                    format!("{base}/{path}")
                }
            }
            _ => url.to_string(),
        }
    }
}
