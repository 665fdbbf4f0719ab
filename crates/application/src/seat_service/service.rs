use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use lectern_core::{AppError, AppResult};
use lectern_domain::{SeatClaim, SeatInfo, SeatSource, SeatSourceKey, UserId};

use super::ports::SeatClaimRepository;

/// Result of a seat claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatClaimOutcome {
    /// A new seat was claimed.
    Claimed(SeatClaim),
    /// The user already held a seat on the source.
    AlreadyClaimed,
}

/// Application service for seat accounting.
#[derive(Clone)]
pub struct SeatService {
    repository: Arc<dyn SeatClaimRepository>,
}

impl SeatService {
    /// Creates a new seat service.
    #[must_use]
    pub fn new(repository: Arc<dyn SeatClaimRepository>) -> Self {
        Self { repository }
    }

    /// Returns seat totals of a source.
    ///
    /// Subscription usage is the number of active claims recorded for it.
    /// Bulk coupon usage is the larger of the coupon's own count and its
    /// recorded claims, since claims do not update the coupon.
    pub async fn seat_info(&self, source: &SeatSource) -> AppResult<SeatInfo> {
        source.validate()?;

        let claimed = self.repository.count_active_claims(&source.key()).await?;
        let claimed = i64::try_from(claimed).unwrap_or(i64::MAX);

        Ok(match source {
            SeatSource::BulkCoupon(coupon) => {
                SeatInfo::new(coupon.max_uses, coupon.used_count.max(claimed))
            }
            SeatSource::Subscription(subscription) => SeatInfo::new(subscription.seats, claimed),
        })
    }

    /// Returns whether the user holds an active claim on the source.
    pub async fn has_user_claimed_seat(
        &self,
        source: &SeatSourceKey,
        user_id: &UserId,
    ) -> AppResult<bool> {
        Ok(self
            .repository
            .find_active_claim(source, user_id)
            .await?
            .is_some())
    }

    /// Claims one seat for the user.
    ///
    /// Claiming twice is not an error. Returns `AppError::Conflict` when the
    /// source has no seats left.
    pub async fn claim_seat(
        &self,
        source: &SeatSource,
        user_id: &UserId,
    ) -> AppResult<SeatClaimOutcome> {
        let key = source.key();
        if self.has_user_claimed_seat(&key, user_id).await? {
            return Ok(SeatClaimOutcome::AlreadyClaimed);
        }

        let seat_info = self.seat_info(source).await?;
        if !seat_info.has_available_seats() {
            return Err(AppError::Conflict(format!(
                "no seats available on '{key}'"
            )));
        }

        let claim = SeatClaim::new(key.clone(), user_id.clone(), Utc::now());
        match self.repository.insert_claim(claim.clone()).await {
            Ok(()) => {
                info!(source = %key, user_id = %user_id, "seat claimed");
                Ok(SeatClaimOutcome::Claimed(claim))
            }
            // A concurrent request claimed the same seat first.
            Err(AppError::Conflict(_)) => Ok(SeatClaimOutcome::AlreadyClaimed),
            Err(error) => Err(error),
        }
    }
}
