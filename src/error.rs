//! Error types for srv-redirector.

use std::time::Duration;

use hickory_proto::op::ResponseCode;
use thiserror::Error;

/// Why a single request could not be redirected.
///
/// Every variant is answered with the same empty `400 Bad Request`; the
/// distinction only exists for logs and metrics.
#[derive(Debug, Error)]
pub enum RedirectError {
    /// No service name could be taken from the request.
    #[error("no service name in request")]
    ExtractionFailed,

    /// The extracted token is not a valid DNS name.
    #[error("invalid service name {name:?}: {source}")]
    InvalidName {
        /// Normalized token that failed to parse.
        name: String,
        /// Parser error.
        source: hickory_proto::ProtoError,
    },

    /// The resolver client returned an error.
    #[error("resolution failed: {0}")]
    ResolutionFailed(#[from] ExchangeError),

    /// Resolution succeeded without any matching SRV record.
    #[error("no SRV records for {0}")]
    NoRecords(String),

    /// The selected target cannot be carried in a `Location` header.
    #[error("invalid redirect target {0:?}")]
    InvalidTarget(String),
}

impl RedirectError {
    /// Short stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RedirectError::ExtractionFailed => "extraction_failed",
            RedirectError::InvalidName { .. } => "invalid_name",
            RedirectError::ResolutionFailed(_) => "resolution_failed",
            RedirectError::NoRecords(_) => "no_records",
            RedirectError::InvalidTarget(_) => "invalid_target",
        }
    }
}

/// Errors from a single DNS exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Socket error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed query or response.
    #[error("DNS protocol error: {0}")]
    Proto(#[from] hickory_proto::ProtoError),

    /// No answer within the configured timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The server answered with an error response code.
    #[error("server responded with {0}")]
    ResponseCode(ResponseCode),
}

/// Errors that stop the redirector from starting or serving.
#[derive(Debug, Error)]
pub enum RedirectorError {
    /// IO error (listener bind etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server error.
    #[error("HTTP server error: {0}")]
    Http(#[from] hyper::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Configuration loaded but is not usable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
