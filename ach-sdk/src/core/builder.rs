//! Client builder implementation
//!
//! Provides a unified builder pattern for creating and configuring backend clients.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client as ReqwestClient;

use crate::config::{BackendConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::core::FromTransport;
use crate::error::{Result, ServiceError};
use crate::services::common::{HttpTransport, UserAgent};

/// Unified client builder for all backend clients
pub struct ClientBuilder {
    /// Base URL for the service
    base_url: Option<String>,

    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// Request timeout
    timeout: Duration,

    /// User agent
    user_agent: UserAgent,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            custom_headers: HashMap::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: UserAgent::default(),
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a backend configuration
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new()
            .base_url(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
    }

    /// Set the base URL for the service
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Build an HTTP client with the configured settings
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent.to_string())
                .map_err(|e| ServiceError::configuration(format!("Invalid user agent: {}", e)))?,
        );

        for (key, value) in &self.custom_headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| ServiceError::configuration(format!("Invalid header name: {}", e)))?;

            let header_value = HeaderValue::from_str(value)
                .map_err(|e| ServiceError::configuration(format!("Invalid header value: {}", e)))?;

            headers.insert(header_name, header_value);
        }

        ReqwestClient::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .gzip(true)
            .build()
            .map_err(|e| ServiceError::configuration(format!("Failed to build HTTP client: {}", e)))
    }

    /// Build a concrete client such as `OdfiClient`
    pub fn build<C: FromTransport>(self) -> Result<C> {
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| ServiceError::configuration(format!("{} base URL is required", C::SERVICE)))?;

        let timeout_seconds = self.timeout.as_secs().max(1);
        let config = BackendConfig::new(C::SERVICE, base_url).timeout_seconds(timeout_seconds);
        config.validate()?;

        let http_client = self.build_http_client()?;
        Ok(C::from_transport(HttpTransport::new(
            C::SERVICE,
            config.normalized_base_url(),
            http_client,
        )))
    }
}
