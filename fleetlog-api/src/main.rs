//! FLEETLOG API Server Entry Point
//!
//! Bootstraps configuration, opens the record store named by `DATABASE_URL`,
//! wires the alert notifier, and starts the Axum HTTP server.

use fleetlog_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use fleetlog_audit::{build_notifier, Notifier, NotifierConfig};
use fleetlog_core::AuditConfig;
use fleetlog_storage::StoreConfig;

use fleetlog_api::telemetry::{init_tracing, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let audit_config = AuditConfig::from_env();
    audit_config.validate()?;
    if audit_config.alert_recipient.is_none() {
        tracing::warn!("FLEETLOG_ALERT_EMAIL not set; mileage alerts will not be sent");
    }

    let notifier_config = NotifierConfig::from_env();
    let notifier = build_notifier(&notifier_config)?;
    tracing::info!(notifier = notifier.name(), "Alert notifier ready");

    let store = StoreConfig::from_env().open()?;

    let api_config = ApiConfig::from_env()?;
    let addr = api_config.bind_addr()?;

    let state = AppState::new(store, notifier, audit_config, api_config);
    let app = create_api_router(state);

    tracing::info!(%addr, "Starting FLEETLOG API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
