//! ODFI client implementation
//!
//! The ODFI service records originated (outbound) ACH entries under
//! `/api/v1/entries`.

mod models;
pub use models::*;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::BackendConfig;
use crate::core::{BackendClient, ClientBuilder, EntryFilter, FromTransport};
use crate::error::Result;
use crate::services::common::{ApiPath, HttpTransport};

const ENTRIES: &str = "api/v1/entries";

/// ODFI service client
#[derive(Debug, Clone)]
pub struct OdfiClient {
    transport: HttpTransport,
}

impl OdfiClient {
    /// Create a client from a backend configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// Create a new builder for the ODFI client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new entry; the service assigns id, status and timestamps
    pub async fn create_entry(&self, request: &CreateOdfiEntryRequest) -> Result<OdfiEntry> {
        self.transport.create_json(ENTRIES, request).await
    }

    /// List entries matching the filter
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<OdfiEntry>> {
        let entries: Option<Vec<OdfiEntry>> = self
            .transport
            .get_json(ENTRIES, &filter.to_query_params())
            .await?;
        Ok(entries.unwrap_or_default())
    }

    /// Fetch one entry; `None` when the service reports 404
    pub async fn get_entry(&self, id: &str) -> Result<Option<OdfiEntry>> {
        self.transport
            .get_optional(ApiPath::new(ENTRIES).id(id))
            .await
    }

    /// Move an entry to a new status
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Option<OdfiEntry>> {
        let body = UpdateStatusRequest {
            status: status.to_string(),
        };
        self.transport
            .send_json_optional(
                Method::PATCH,
                ApiPath::new(ENTRIES).id(id).route("status"),
                &body,
            )
            .await
    }
}

impl FromTransport for OdfiClient {
    const SERVICE: &'static str = "odfi";

    fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl BackendClient for OdfiClient {
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
