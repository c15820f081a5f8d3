//! The request pipeline: extract, normalize, resolve, select, redirect.

use std::sync::Arc;

use http::header::{HeaderValue, LOCATION};
use http::request::Parts;
use http::StatusCode;
use hyper::{Body, Request, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RedirectError;
use crate::extractor::{ExtractorConfig, NameExtractor};
use crate::metrics;
use crate::name::normalize;
use crate::resolver::{lookup_srv, Exchange};
use crate::strategies::{SelectionStrategy, StrategyConfig};

/// Redirect behaviour: where names are read from and how targets are picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Path prefix every request must start with.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Status code of successful responses.
    #[serde(default = "default_status_code")]
    pub status_code: u16,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_status_code() -> u16 {
    StatusCode::SEE_OTHER.as_u16()
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            status_code: default_status_code(),
            strategy: StrategyConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

/// Answers each request with a redirect to one SRV target of the requested
/// service.
///
/// The handler keeps no per-request state; the only thing mutated across
/// requests is the strategy, and only after resolution has finished.
pub struct RedirectHandler {
    exchange: Arc<dyn Exchange>,
    base_path: String,
    status: StatusCode,
    strategy: Arc<dyn SelectionStrategy>,
    extractor: Arc<dyn NameExtractor>,
}

impl RedirectHandler {
    pub fn new(
        exchange: Arc<dyn Exchange>,
        base_path: impl Into<String>,
        status: StatusCode,
        strategy: Arc<dyn SelectionStrategy>,
        extractor: Arc<dyn NameExtractor>,
    ) -> Self {
        Self {
            exchange,
            base_path: base_path.into(),
            status,
            strategy,
            extractor,
        }
    }

    pub fn from_config(
        config: &RedirectConfig,
        exchange: Arc<dyn Exchange>,
    ) -> Result<Self, http::Error> {
        let status = StatusCode::from_u16(config.status_code)?;
        let extractor = config.extractor.build(&config.base_path)?;
        Ok(Self::new(
            exchange,
            config.base_path.clone(),
            status,
            config.strategy.build(),
            extractor,
        ))
    }

    /// Resolves the request to the redirect target URL.
    pub async fn locate(&self, parts: &Parts) -> Result<String, RedirectError> {
        if !parts.uri.path().starts_with(self.base_path.as_str()) {
            return Err(RedirectError::ExtractionFailed);
        }

        let token = self.extractor.extract(parts)?;
        let fqdn = normalize(&token);

        // No strategy state is touched until the lookup has returned.
        let candidates = lookup_srv(self.exchange.as_ref(), &fqdn).await?;
        metrics::record_candidates(candidates.len());

        let candidate = self
            .strategy
            .pick(&candidates)
            .ok_or_else(|| RedirectError::NoRecords(fqdn.to_string()))?;
        Ok(candidate.location())
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let (parts, _body) = req.into_parts();

        let result = match self.locate(&parts).await {
            Ok(location) => match HeaderValue::from_str(&location) {
                Ok(value) => Ok((location, value)),
                Err(_) => Err(RedirectError::InvalidTarget(location)),
            },
            Err(err) => Err(err),
        };

        match result {
            Ok((location, value)) => {
                debug!(method = %parts.method, path = %parts.uri.path(), %location, "redirect");
                metrics::record_request("redirect");
                redirect_response(self.status, value)
            }
            Err(err) => {
                debug!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    error = %err,
                    kind = err.kind(),
                    "request not redirected"
                );
                metrics::record_request(err.kind());
                response_with_status(StatusCode::BAD_REQUEST)
            }
        }
    }
}

fn redirect_response(status: StatusCode, location: HeaderValue) -> Response<Body> {
    let mut resp = response_with_status(status);
    resp.headers_mut().insert(LOCATION, location);
    resp
}

fn response_with_status(status: StatusCode) -> Response<Body> {
    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = status;
    resp
}
