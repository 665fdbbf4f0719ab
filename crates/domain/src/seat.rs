//! Seat accounting for bulk coupons and team subscriptions.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BulkCoupon, Subscription, TeamSubscription, UserId};

/// Returns whether a pool still has seats to hand out.
#[must_use]
pub fn has_available_seats(total: i64, used: i64) -> bool {
    used < total
}

/// Seat totals for one source.
///
/// `used` never exceeds `total`; claims beyond the ceiling are reported in
/// `overage`. This keeps `total == used + available` for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    total: u64,
    used: u64,
    available: u64,
    overage: u64,
}

impl SeatInfo {
    /// Computes seat totals from raw counts. Negative counts read as zero.
    #[must_use]
    pub fn new(total: i64, used: i64) -> Self {
        let total = u64::try_from(total).unwrap_or(0);
        let raw_used = u64::try_from(used).unwrap_or(0);
        let used = raw_used.min(total);

        Self {
            total,
            used,
            available: total - used,
            overage: raw_used - used,
        }
    }

    /// Seat totals of a bulk coupon.
    #[must_use]
    pub fn for_bulk_coupon(coupon: &BulkCoupon) -> Self {
        Self::new(coupon.max_uses, coupon.used_count)
    }

    /// Seat totals of a team subscription summary.
    #[must_use]
    pub fn for_team_subscription(subscription: &TeamSubscription) -> Self {
        Self::new(subscription.total_seats, subscription.used_seats)
    }

    /// Seat ceiling.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Claimed seats, capped at the ceiling.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Seats left to claim.
    #[must_use]
    pub fn available(&self) -> u64 {
        self.available
    }

    /// Claims recorded beyond the ceiling.
    #[must_use]
    pub fn overage(&self) -> u64 {
        self.overage
    }

    /// Returns whether at least one seat can be claimed.
    #[must_use]
    pub fn has_available_seats(&self) -> bool {
        self.available > 0
    }
}

/// Kind of seat pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatSourceType {
    /// Bulk coupon bought with a purchase.
    BulkCoupon,
    /// Team subscription.
    Subscription,
}

impl SeatSourceType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BulkCoupon => "bulk_coupon",
            Self::Subscription => "subscription",
        }
    }
}

impl Display for SeatSourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SeatSourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bulk_coupon" => Ok(Self::BulkCoupon),
            "subscription" => Ok(Self::Subscription),
            _ => Err(AppError::Validation(format!(
                "unknown seat source type '{value}'"
            ))),
        }
    }
}

/// Identity of a seat pool, the uniqueness scope of a claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSourceKey {
    /// Pool kind.
    pub source_type: SeatSourceType,
    /// Coupon or subscription id.
    pub source_id: String,
}

impl Display for SeatSourceKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.source_type, self.source_id)
    }
}

/// Seat pool with the facts needed to account for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sourceType", rename_all = "snake_case")]
pub enum SeatSource {
    /// Bulk coupon pool.
    BulkCoupon(BulkCoupon),
    /// Team subscription pool.
    Subscription(Subscription),
}

impl SeatSource {
    /// Returns the pool identity.
    #[must_use]
    pub fn key(&self) -> SeatSourceKey {
        match self {
            Self::BulkCoupon(coupon) => SeatSourceKey {
                source_type: SeatSourceType::BulkCoupon,
                source_id: coupon.id.clone(),
            },
            Self::Subscription(subscription) => SeatSourceKey {
                source_type: SeatSourceType::Subscription,
                source_id: subscription.id.clone(),
            },
        }
    }

    /// Checks structural invariants of the underlying record.
    pub fn validate(&self) -> AppResult<()> {
        match self {
            Self::BulkCoupon(coupon) => coupon.validate(),
            Self::Subscription(subscription) => subscription.validate(),
        }
    }
}

/// One claimed seat, bound to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatClaim {
    /// Claim id.
    pub id: Uuid,
    /// Pool the seat belongs to.
    pub source: SeatSourceKey,
    /// Seat holder.
    pub user_id: UserId,
    /// Claim time.
    pub claimed_at: DateTime<Utc>,
    /// Release time; released claims no longer occupy a seat.
    #[serde(default)]
    pub released_at: Option<DateTime<Utc>>,
}

impl SeatClaim {
    /// Creates a fresh active claim.
    #[must_use]
    pub fn new(source: SeatSourceKey, user_id: UserId, claimed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            user_id,
            claimed_at,
            released_at: None,
        }
    }

    /// Returns whether the claim still occupies a seat.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.released_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::{SeatInfo, SeatSource, SeatSourceType, has_available_seats};
    use crate::BulkCoupon;

    #[test]
    fn full_coupon_has_no_available_seats() {
        let info = SeatInfo::for_bulk_coupon(&BulkCoupon {
            id: "coupon-1".to_owned(),
            max_uses: 5,
            used_count: 5,
        });
        assert_eq!(info.available(), 0);
        assert!(!info.has_available_seats());
        assert!(!has_available_seats(5, 5));
        assert!(has_available_seats(5, 4));
    }

    #[test]
    fn oversubscribed_pool_reports_overage() {
        let info = SeatInfo::new(3, 5);
        assert_eq!(info.used(), 3);
        assert_eq!(info.available(), 0);
        assert_eq!(info.overage(), 2);
    }

    #[test]
    fn seat_source_decodes_tagged_payload() {
        let source = serde_json::from_value::<SeatSource>(json!({
            "sourceType": "bulk_coupon",
            "id": "coupon-1",
            "maxUses": 10,
            "usedCount": 2
        }));
        assert!(source.is_ok());
        let Ok(source) = source else {
            return;
        };
        let key = source.key();
        assert_eq!(key.source_type, SeatSourceType::BulkCoupon);
        assert_eq!(key.to_string(), "bulk_coupon:coupon-1");
    }

    proptest! {
        /// Seats are conserved for any raw counts.
        #[test]
        fn seats_are_conserved(total in -10_i64..1_000, used in -10_i64..1_000) {
            let info = SeatInfo::new(total, used);
            prop_assert_eq!(info.total(), info.used() + info.available());
            prop_assert!(info.used() <= info.total());
            prop_assert_eq!(info.has_available_seats(), has_available_seats(total.max(0), used.max(0)));
        }
    }
}
