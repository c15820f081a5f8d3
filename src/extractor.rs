//! Pulling a service name token out of an incoming request.

use std::borrow::Cow;
use std::sync::Arc;

use http::header::{HeaderName, HOST};
use http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::error::RedirectError;

/// Pulls the service name token out of a request.
pub trait NameExtractor: Send + Sync {
    fn extract<'r>(&self, parts: &'r Parts) -> Result<Cow<'r, str>, RedirectError>;
}

/// Takes the first path segment after a base path, percent-decoded.
///
/// With base `/srv/`, the request `/srv/_http._tcp.example/ignored` yields
/// `_http._tcp.example`, and so does `/srv/%5Fhttp._tcp.example`.
#[derive(Debug, Clone)]
pub struct PathExtractor {
    base_path: String,
}

impl PathExtractor {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl NameExtractor for PathExtractor {
    fn extract<'r>(&self, parts: &'r Parts) -> Result<Cow<'r, str>, RedirectError> {
        let rest = parts
            .uri
            .path()
            .strip_prefix(self.base_path.as_str())
            .ok_or(RedirectError::ExtractionFailed)?;

        // `/svc` must not match `/svcfoo`.
        if !self.base_path.ends_with('/') && !rest.is_empty() && !rest.starts_with('/') {
            return Err(RedirectError::ExtractionFailed);
        }

        let token = rest
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        let token = urlencoding::decode(token).map_err(|_| RedirectError::ExtractionFailed)?;
        if token.is_empty() {
            return Err(RedirectError::ExtractionFailed);
        }
        Ok(token)
    }
}

/// Takes the value of a request header.
///
/// For `Host` the port suffix is dropped, and the URI authority is used
/// when the header itself is absent. A header that is present but not
/// visible ASCII fails extraction.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    name: HeaderName,
}

impl HeaderExtractor {
    pub fn new(name: HeaderName) -> Self {
        Self { name }
    }
}

impl NameExtractor for HeaderExtractor {
    fn extract<'r>(&self, parts: &'r Parts) -> Result<Cow<'r, str>, RedirectError> {
        let token = match parts.headers.get(&self.name) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| RedirectError::ExtractionFailed)?
                    .trim();
                if self.name == HOST {
                    strip_port(value)
                } else {
                    value
                }
            }
            None if self.name == HOST => parts.uri.host().unwrap_or_default(),
            None => "",
        };

        if token.is_empty() {
            return Err(RedirectError::ExtractionFailed);
        }
        Ok(Cow::Borrowed(token))
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Extractor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorConfig {
    /// First path segment after the base path.
    #[default]
    Path,
    /// Value of the named header.
    Header {
        /// Header name, e.g. `Host`.
        name: String,
    },
}

impl ExtractorConfig {
    pub fn build(&self, base_path: &str) -> Result<Arc<dyn NameExtractor>, http::Error> {
        Ok(match self {
            ExtractorConfig::Path => Arc::new(PathExtractor::new(base_path)),
            ExtractorConfig::Header { name } => {
                Arc::new(HeaderExtractor::new(HeaderName::try_from(name.as_str())?))
            }
        })
    }
}
