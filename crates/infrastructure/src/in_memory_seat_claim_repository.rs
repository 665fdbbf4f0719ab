use std::collections::HashMap;

use async_trait::async_trait;
use lectern_application::SeatClaimRepository;
use lectern_core::{AppError, AppResult};
use lectern_domain::{SeatClaim, SeatSourceKey, UserId};
use tokio::sync::RwLock;

/// In-memory seat claim repository implementation.
#[derive(Debug, Default)]
pub struct InMemorySeatClaimRepository {
    active_claims: RwLock<HashMap<(SeatSourceKey, UserId), SeatClaim>>,
}

impl InMemorySeatClaimRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_claims: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SeatClaimRepository for InMemorySeatClaimRepository {
    async fn find_active_claim(
        &self,
        source: &SeatSourceKey,
        user_id: &UserId,
    ) -> AppResult<Option<SeatClaim>> {
        let claims = self.active_claims.read().await;
        Ok(claims.get(&(source.clone(), user_id.clone())).cloned())
    }

    async fn count_active_claims(&self, source: &SeatSourceKey) -> AppResult<u64> {
        let claims = self.active_claims.read().await;
        let count = claims
            .keys()
            .filter(|(claimed_source, _)| claimed_source == source)
            .count();

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("seat count overflow: {error}")))
    }

    async fn insert_claim(&self, claim: SeatClaim) -> AppResult<()> {
        if !claim.is_active() {
            return Err(AppError::Validation(format!(
                "seat claim '{}' is already released",
                claim.id
            )));
        }

        let key = (claim.source.clone(), claim.user_id.clone());
        let mut claims = self.active_claims.write().await;

        if claims.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds a seat on '{}'",
                key.1, key.0
            )));
        }

        claims.insert(key, claim);
        Ok(())
    }
}
