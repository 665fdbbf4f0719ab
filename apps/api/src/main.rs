//! Lectern API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use lectern_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, SeatStoreConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, build_seat_claim_repository, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        if let SeatStoreConfig::Postgres { database_url } = &config.seat_store {
            connect_and_migrate(database_url).await?;
            info!("database migrations applied successfully");
        }
        return Ok(());
    }

    let seat_claim_repository = build_seat_claim_repository(&config.seat_store).await?;
    let app_state = build_app_state(&config, seat_claim_repository);
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        subscription_entitlements = ?config.access_policy.subscription_entitlement_types,
        "lectern-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
