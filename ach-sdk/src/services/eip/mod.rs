//! EIP client implementation

mod models;
pub use models::*;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::BackendConfig;
use crate::core::{BackendClient, ClientBuilder, FromTransport};
use crate::error::Result;
use crate::services::common::{ApiPath, HttpTransport};

const CASES: &str = "api/v1/cases";

/// EIP service client
#[derive(Debug, Clone)]
pub struct EipClient {
    transport: HttpTransport,
}

impl EipClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn create_case(&self, request: &CreateCaseRequest) -> Result<EipCase> {
        self.transport.create_json(CASES, request).await
    }

    pub async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<EipCase>> {
        let cases: Option<Vec<EipCase>> = self
            .transport
            .get_json(CASES, &filter.to_query_params())
            .await?;
        Ok(cases.unwrap_or_default())
    }

    pub async fn get_case(&self, id: &str) -> Result<Option<EipCase>> {
        self.transport.get_optional(ApiPath::new(CASES).id(id)).await
    }

    pub async fn update_status(&self, id: &str, status: &str) -> Result<Option<EipCase>> {
        let body = UpdateCaseStatusRequest {
            status: status.to_string(),
        };
        self.transport
            .send_json_optional(
                Method::PATCH,
                ApiPath::new(CASES).id(id).route("status"),
                &body,
            )
            .await
    }
}

impl FromTransport for EipClient {
    const SERVICE: &'static str = "eip";

    fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl BackendClient for EipClient {
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
