use async_trait::async_trait;

use lectern_core::AppResult;
use lectern_domain::{SeatClaim, SeatSourceKey, UserId};

/// Repository port for seat claim persistence.
#[async_trait]
pub trait SeatClaimRepository: Send + Sync {
    /// Returns the active claim of a user on a source, if any.
    async fn find_active_claim(
        &self,
        source: &SeatSourceKey,
        user_id: &UserId,
    ) -> AppResult<Option<SeatClaim>>;

    /// Counts active claims on a source.
    async fn count_active_claims(&self, source: &SeatSourceKey) -> AppResult<u64>;

    /// Stores a new claim.
    ///
    /// Returns `AppError::Validation` for a claim that is already released
    /// and `AppError::Conflict` when the user already holds an active claim
    /// on the same source.
    async fn insert_claim(&self, claim: SeatClaim) -> AppResult<()>;
}
