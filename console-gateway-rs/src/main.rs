// console-gateway-rs/src/main.rs
// ACH Console Gateway - unified view over the ODFI/RDFI services
// Port 8080 - HTTP/REST entry point for the operator console

use std::sync::Arc;

use anyhow::Context;
use config_rs::GatewayConfig;
use console_gateway::{create_router, telemetry, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env();
    telemetry::init_tracing(config.log_format).context("failed to initialize tracing")?;

    let state = AppState::from_config(&config).context("invalid backend configuration")?;

    for (backend, healthy) in state.backend_health().await {
        if healthy {
            info!("Backend {} is reachable", backend);
        } else {
            warn!("Backend {} is not reachable; its routes will degrade", backend);
        }
    }

    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    info!("Console gateway starting on {}", config.bind_address);
    info!(
        odfi = %config.odfi_base_url,
        rdfi = %config.rdfi_base_url,
        ledger = %config.ledger_base_url,
        eip = %config.eip_base_url,
        "Backend targets"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Console gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
