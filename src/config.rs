//! Configuration types for srv-redirector.

use std::path::Path;

use http::header::HeaderName;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::RedirectorError;
use crate::extractor::ExtractorConfig;
use crate::redirector::RedirectConfig;
use crate::resolver::ResolverConfig;
use crate::server::ServerConfig;
use crate::telemetry::TelemetryConfig;

/// Prefix of environment variables overriding file settings, e.g.
/// `SRV_REDIRECTOR__REDIRECT__STATUS_CODE=307`.
pub const ENV_PREFIX: &str = "SRV_REDIRECTOR";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub redirect: RedirectConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Loads the TOML file at `path` (if it exists) layered under
    /// `SRV_REDIRECTOR__*` environment variables, then validates the result.
    pub fn load(path: &Path) -> Result<Self, RedirectorError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RedirectorError> {
        let redirect = &self.redirect;

        if !redirect.base_path.starts_with('/') {
            return Err(RedirectorError::Config(format!(
                "base_path must start with '/': {:?}",
                redirect.base_path
            )));
        }

        StatusCode::from_u16(redirect.status_code).map_err(|_| {
            RedirectorError::Config(format!("invalid status_code {}", redirect.status_code))
        })?;

        if let ExtractorConfig::Header { name } = &redirect.extractor {
            HeaderName::try_from(name.as_str())
                .map_err(|_| RedirectorError::Config(format!("invalid header name {:?}", name)))?;
        }

        if self.resolver.timeout_ms == 0 {
            return Err(RedirectorError::Config("resolver timeout_ms must be positive".to_string()));
        }

        Ok(())
    }
}
