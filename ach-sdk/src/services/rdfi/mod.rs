//! RDFI client implementation
//!
//! The RDFI service records received (inbound) ACH entries and lets an
//! operator return them with a reason code.

mod models;
pub use models::*;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::BackendConfig;
use crate::core::{BackendClient, ClientBuilder, EntryFilter, FromTransport};
use crate::error::Result;
use crate::services::common::{ApiPath, HttpTransport};

const ENTRIES: &str = "api/v1/entries";

/// RDFI service client
#[derive(Debug, Clone)]
pub struct RdfiClient {
    transport: HttpTransport,
}

impl RdfiClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn create_entry(&self, request: &CreateRdfiEntryRequest) -> Result<RdfiEntry> {
        self.transport.create_json(ENTRIES, request).await
    }

    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<RdfiEntry>> {
        let entries: Option<Vec<RdfiEntry>> = self
            .transport
            .get_json(ENTRIES, &filter.to_query_params())
            .await?;
        Ok(entries.unwrap_or_default())
    }

    /// Fetch one entry; `None` when the service reports 404
    pub async fn get_entry(&self, id: &str) -> Result<Option<RdfiEntry>> {
        self.transport
            .get_optional(ApiPath::new(ENTRIES).id(id))
            .await
    }

    /// Return an entry with the given reason code (e.g. "R01")
    ///
    /// `None` means the entry does not exist. A 400 from the service (entry
    /// already returned, empty reason) surfaces as a validation error.
    pub async fn return_entry(&self, id: &str, reason: &str) -> Result<Option<RdfiEntry>> {
        let body = ReturnRequest {
            reason: reason.to_string(),
        };
        self.transport
            .send_json_optional(
                Method::POST,
                ApiPath::new(ENTRIES).id(id).route("return"),
                &body,
            )
            .await
    }
}

impl FromTransport for RdfiClient {
    const SERVICE: &'static str = "rdfi";

    fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl BackendClient for RdfiClient {
    fn name(&self) -> &str {
        self.transport.service()
    }

    fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    async fn health_check(&self) -> Result<bool> {
        self.transport.health().await
    }
}
