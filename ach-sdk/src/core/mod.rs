//! Core abstractions for the ACH SDK
//!
//! - `BackendClient`: the base trait every record-keeping service client implements
//! - `FromTransport`: lets `ClientBuilder` produce any concrete client
//! - `ClientBuilder`: builder pattern for creating clients
//! - `EntryFilter`: the optional list filters shared by the entry services

pub mod builder;
pub use builder::ClientBuilder;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::common::HttpTransport;

/// Base trait for all backend service clients
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;

    /// Probe `GET /healthz`; an unreachable backend reports `false`
    async fn health_check(&self) -> Result<bool>;
}

/// Clients that can be assembled around a configured transport
pub trait FromTransport: Sized {
    /// Service name used for logging and error context
    const SERVICE: &'static str;

    /// Wrap an already configured transport
    fn from_transport(transport: HttpTransport) -> Self;
}

/// Optional list filters shared by the entry services
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub status: Option<String>,
    pub trace_number: Option<String>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn trace_number(mut self, trace_number: impl Into<String>) -> Self {
        self.trace_number = Some(trace_number.into());
        self
    }

    /// Query parameters for the list endpoint; empty filters are omitted
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_param(&mut params, "status", self.status.as_deref());
        push_param(&mut params, "trace_number", self.trace_number.as_deref());
        params
    }
}

/// Append `key=value` when the value is present and non-empty
pub(crate) fn push_param(
    params: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<&str>,
) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_params() {
        assert!(EntryFilter::new().to_query_params().is_empty());
        assert!(EntryFilter::new().status("").to_query_params().is_empty());
    }

    #[test]
    fn test_filter_params() {
        let params = EntryFilter::new()
            .status("PENDING")
            .trace_number("091000019999999")
            .to_query_params();

        assert_eq!(
            params,
            vec![
                ("status", "PENDING".to_string()),
                ("trace_number", "091000019999999".to_string()),
            ]
        );
    }
}
