//! # Console Gateway
//!
//! HTTP gateway for the ACH operator console. The core is the [`Aggregator`],
//! which fans a query out to the ODFI and RDFI services concurrently and merges
//! whatever comes back into one sorted page, reporting degraded backends in
//! `service_info` instead of failing. The remaining routes pass through to the
//! individual record-keeping services.

use std::sync::Arc;

use ach_sdk::{
    BackendClient, BackendConfig, ClientBuilder, EipClient, LedgerClient, OdfiClient, RdfiClient,
    UserAgent,
};
use axum::routing::{get, patch, post};
use axum::Router;
use config_rs::GatewayConfig;
use futures::future::join_all;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod aggregator;
pub mod error;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod sorting;
pub mod telemetry;
pub mod validation;

pub use aggregator::{AggregateQuery, Aggregator, EntrySource};
pub use error::GatewayError;
pub use models::{AggregationResponse, ServiceHealth, Side, SideExtra, UnifiedAchItem};
use validation::Limits;

/// Identifies the gateway to the backends
fn user_agent() -> UserAgent {
    UserAgent {
        app_name: "console-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        extra: None,
    }
}

/// Shared application state
pub struct AppState {
    pub aggregator: Aggregator,
    pub odfi: OdfiClient,
    pub rdfi: RdfiClient,
    pub ledger: LedgerClient,
    pub eip: EipClient,
    pub limits: Limits,
}

impl AppState {
    /// Build every backend client and the aggregator from process configuration
    pub fn from_config(config: &GatewayConfig) -> ach_sdk::Result<Self> {
        let backend = |service: &str, url: &str| {
            let settings =
                BackendConfig::new(service, url).timeout_seconds(config.backend_timeout_seconds);
            ClientBuilder::from_config(&settings).user_agent(user_agent())
        };

        let odfi: OdfiClient = backend("odfi", config.odfi_base_url.as_str()).build()?;
        let rdfi: RdfiClient = backend("rdfi", config.rdfi_base_url.as_str()).build()?;
        let ledger: LedgerClient = backend("ledger", config.ledger_base_url.as_str()).build()?;
        let eip: EipClient = backend("eip", config.eip_base_url.as_str()).build()?;

        let aggregator = Aggregator::from_clients(odfi.clone(), rdfi.clone())
            .with_deadline(config.request_deadline);

        Ok(Self {
            aggregator,
            odfi,
            rdfi,
            ledger,
            eip,
            limits: Limits {
                default_limit: config.default_limit,
                max_limit: config.max_limit,
            },
        })
    }

    /// Probe `GET /healthz` on every backend at once
    pub async fn backend_health(&self) -> Vec<(String, bool)> {
        let clients: [&dyn BackendClient; 4] = [&self.odfi, &self.rdfi, &self.ledger, &self.eip];

        join_all(clients.into_iter().map(|client| async move {
            let healthy = client.health_check().await.unwrap_or(false);
            (client.name().to_string(), healthy)
        }))
        .await
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/ach-items", get(handlers::list_ach_items))
        .route("/api/v1/ach-items/:side/:id", get(handlers::get_ach_item))
        .route("/api/v1/ach-items/:side/:id/return", post(handlers::return_ach_item))
        .route(
            "/api/v1/odfi/entries",
            post(handlers::create_odfi_entry).get(handlers::list_odfi_entries),
        )
        .route("/api/v1/odfi/entries/:id", get(handlers::get_odfi_entry))
        .route("/api/v1/odfi/entries/:id/status", patch(handlers::update_odfi_status))
        .route(
            "/api/v1/rdfi/entries",
            post(handlers::create_rdfi_entry).get(handlers::list_rdfi_entries),
        )
        .route("/api/v1/rdfi/entries/:id", get(handlers::get_rdfi_entry))
        .route("/api/v1/rdfi/entries/:id/return", post(handlers::return_rdfi_entry))
        .route(
            "/api/v1/ledger/postings",
            post(handlers::create_posting).get(handlers::list_postings),
        )
        .route("/api/v1/ledger/balances", get(handlers::get_balances))
        .route(
            "/api/v1/eip/cases",
            post(handlers::create_case).get(handlers::list_cases),
        )
        .route("/api/v1/eip/cases/:id", get(handlers::get_case))
        .route("/api/v1/eip/cases/:id/status", patch(handlers::update_case_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
