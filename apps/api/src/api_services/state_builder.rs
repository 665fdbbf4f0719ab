use std::sync::Arc;

use lectern_application::{RuleCompiler, SeatClaimRepository, SeatService};
use lectern_core::AppError;
use lectern_infrastructure::{InMemorySeatClaimRepository, PostgresSeatClaimRepository};
use tracing::warn;

use crate::api_config::{ApiConfig, SeatStoreConfig};
use crate::state::AppState;

use super::database::connect_and_migrate;

pub async fn build_seat_claim_repository(
    seat_store: &SeatStoreConfig,
) -> Result<Arc<dyn SeatClaimRepository>, AppError> {
    match seat_store {
        SeatStoreConfig::Memory => {
            warn!("SEAT_STORE=memory: seat claims are lost on restart");
            Ok(Arc::new(InMemorySeatClaimRepository::new()))
        }
        SeatStoreConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            Ok(Arc::new(PostgresSeatClaimRepository::new(pool)))
        }
    }
}

pub fn build_app_state(
    config: &ApiConfig,
    seat_claim_repository: Arc<dyn SeatClaimRepository>,
) -> AppState {
    AppState {
        rule_compiler: RuleCompiler::new(config.access_policy.clone()),
        seat_service: SeatService::new(seat_claim_repository),
        invite_base_url: config.invite_base_url.clone(),
    }
}
