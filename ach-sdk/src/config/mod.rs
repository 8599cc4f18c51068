//! Per-backend client configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ServiceError};

/// Default request timeout for backend calls
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for one backend service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Short service name used in logs and errors (e.g. "odfi")
    pub service: String,

    /// Base URL without the `/api/v1` suffix
    pub base_url: String,

    /// Timeout in seconds for a single outbound request
    pub timeout_seconds: u64,
}

impl BackendConfig {
    /// Create a configuration with the default timeout
    pub fn new(service: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Override the request timeout
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Base URL with any trailing slash removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(ServiceError::configuration("Service name is required"));
        }

        if self.base_url.is_empty() {
            return Err(ServiceError::configuration(format!(
                "{} base URL is required",
                self.service
            )));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            ServiceError::configuration(format!(
                "Invalid {} base URL '{}': {}",
                self.service, self.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ServiceError::configuration(format!(
                "{} base URL must use http or https, got '{}'",
                self.service,
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration(format!(
                "{} timeout must be greater than zero",
                self.service
            )));
        }

        Ok(())
    }
}
