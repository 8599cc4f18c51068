//! Ledger client implementation

mod models;
pub use models::*;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::core::{BackendClient, ClientBuilder, FromTransport};
use crate::error::Result;
use crate::services::common::HttpTransport;

const POSTINGS: &str = "api/v1/postings";
const BALANCES: &str = "api/v1/balances";

/// Ledger service client
#[derive(Debug, Clone)]
pub struct LedgerClient {
    transport: HttpTransport,
}

impl LedgerClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn create_posting(&self, request: &CreatePostingRequest) -> Result<LedgerPosting> {
        self.transport.create_json(POSTINGS, request).await
    }

    pub async fn list_postings(&self, filter: &PostingFilter) -> Result<Vec<LedgerPosting>> {
        let postings: Option<Vec<LedgerPosting>> = self
            .transport
            .get_json(POSTINGS, &filter.to_query_params())
            .await?;
        Ok(postings.unwrap_or_default())
    }

    pub async fn balances(&self) -> Result<BalanceResponse> {
        self.transport.get_json(BALANCES, &[]).await
    }
}

impl FromTransport for LedgerClient {
    const SERVICE: &'static str = "ledger";

    fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl BackendClient for LedgerClient {
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
