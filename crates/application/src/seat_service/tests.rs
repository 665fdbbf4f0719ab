use std::sync::Arc;

use async_trait::async_trait;
use lectern_core::{AppError, AppResult};
use lectern_domain::{BulkCoupon, SeatClaim, SeatSource, SeatSourceKey, Subscription, UserId};
use tokio::sync::Mutex;

use super::{SeatClaimOutcome, SeatClaimRepository, SeatService, invite_link};

#[derive(Default)]
struct FakeSeatClaimRepository {
    claims: Mutex<Vec<SeatClaim>>,
}

#[async_trait]
impl SeatClaimRepository for FakeSeatClaimRepository {
    async fn find_active_claim(
        &self,
        source: &SeatSourceKey,
        user_id: &UserId,
    ) -> AppResult<Option<SeatClaim>> {
        Ok(self
            .claims
            .lock()
            .await
            .iter()
            .find(|claim| claim.is_active() && &claim.source == source && &claim.user_id == user_id)
            .cloned())
    }

    async fn count_active_claims(&self, source: &SeatSourceKey) -> AppResult<u64> {
        let count = self
            .claims
            .lock()
            .await
            .iter()
            .filter(|claim| claim.is_active() && &claim.source == source)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert_claim(&self, claim: SeatClaim) -> AppResult<()> {
        let mut claims = self.claims.lock().await;
        if claims.iter().any(|existing| {
            existing.is_active()
                && existing.source == claim.source
                && existing.user_id == claim.user_id
        }) {
            return Err(AppError::Conflict("seat already claimed".to_owned()));
        }
        claims.push(claim);
        Ok(())
    }
}

/// Loses every race: lookups see nothing, inserts hit the unique index.
struct RacingSeatClaimRepository;

#[async_trait]
impl SeatClaimRepository for RacingSeatClaimRepository {
    async fn find_active_claim(
        &self,
        _source: &SeatSourceKey,
        _user_id: &UserId,
    ) -> AppResult<Option<SeatClaim>> {
        Ok(None)
    }

    async fn count_active_claims(&self, _source: &SeatSourceKey) -> AppResult<u64> {
        Ok(0)
    }

    async fn insert_claim(&self, _claim: SeatClaim) -> AppResult<()> {
        Err(AppError::Conflict("seat already claimed".to_owned()))
    }
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("test user id"))
}

fn team_subscription(seats: i64) -> SeatSource {
    SeatSource::Subscription(Subscription {
        id: "sub-1".to_owned(),
        owner_id: user_id("owner-1"),
        seats,
        status: "active".to_owned(),
    })
}

fn bulk_coupon(max_uses: i64, used_count: i64) -> SeatSource {
    SeatSource::BulkCoupon(BulkCoupon {
        id: "coupon-1".to_owned(),
        max_uses,
        used_count,
    })
}

fn service() -> SeatService {
    SeatService::new(Arc::new(FakeSeatClaimRepository::default()))
}

#[tokio::test]
async fn bulk_coupon_seat_info_uses_coupon_counts() {
    let info = service().seat_info(&bulk_coupon(5, 5)).await;

    assert!(info.is_ok());
    let info = info.unwrap_or_else(|_| unreachable!());
    assert_eq!(info.total(), 5);
    assert_eq!(info.available(), 0);
    assert!(!info.has_available_seats());
}

#[tokio::test]
async fn subscription_seat_info_counts_active_claims() {
    let service = service();
    let source = team_subscription(3);

    let claimed = service.claim_seat(&source, &user_id("member-1")).await;
    assert!(matches!(claimed, Ok(SeatClaimOutcome::Claimed(_))));

    let info = service.seat_info(&source).await;
    assert!(info.is_ok());
    let info = info.unwrap_or_else(|_| unreachable!());
    assert_eq!(info.used(), 1);
    assert_eq!(info.available(), 2);
}

#[tokio::test]
async fn claiming_twice_is_idempotent() {
    let service = service();
    let source = team_subscription(3);
    let member = user_id("member-1");

    let first = service.claim_seat(&source, &member).await;
    let second = service.claim_seat(&source, &member).await;

    assert!(matches!(first, Ok(SeatClaimOutcome::Claimed(_))));
    assert!(matches!(second, Ok(SeatClaimOutcome::AlreadyClaimed)));
    assert!(
        service
            .has_user_claimed_seat(&source.key(), &member)
            .await
            .is_ok_and(|claimed| claimed)
    );
    assert_eq!(
        service
            .seat_info(&source)
            .await
            .map(|info| info.used())
            .unwrap_or_default(),
        1
    );
}

#[tokio::test]
async fn full_subscription_rejects_new_claims() {
    let service = service();
    let source = team_subscription(2);

    assert!(service.claim_seat(&source, &user_id("member-1")).await.is_ok());
    assert!(service.claim_seat(&source, &user_id("member-2")).await.is_ok());

    let result = service.claim_seat(&source, &user_id("member-3")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn full_bulk_coupon_rejects_new_claims() {
    let result = service()
        .claim_seat(&bulk_coupon(5, 5), &user_id("member-1"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn bulk_coupon_claims_stop_at_max_uses() {
    let service = service();
    let source = bulk_coupon(2, 0);

    let mut claimed = 0;
    for member in ["member-1", "member-2", "member-3", "member-4", "member-5"] {
        if let Ok(SeatClaimOutcome::Claimed(_)) =
            service.claim_seat(&source, &user_id(member)).await
        {
            claimed += 1;
        }
    }

    assert_eq!(claimed, 2);
    let info = service.seat_info(&source).await;
    assert!(info.is_ok_and(|info| info.used() == 2 && !info.has_available_seats()));
}

#[tokio::test]
async fn bulk_coupon_usage_keeps_the_larger_count() {
    let service = service();
    let source = bulk_coupon(5, 3);

    assert!(service.claim_seat(&source, &user_id("member-1")).await.is_ok());

    let info = service.seat_info(&source).await;
    assert!(info.is_ok_and(|info| info.used() == 3 && info.available() == 2));
}

#[tokio::test]
async fn lost_claim_race_reports_already_claimed() {
    let service = SeatService::new(Arc::new(RacingSeatClaimRepository));

    let result = service
        .claim_seat(&team_subscription(5), &user_id("member-1"))
        .await;

    assert!(matches!(result, Ok(SeatClaimOutcome::AlreadyClaimed)));
}

#[tokio::test]
async fn malformed_source_is_rejected() {
    let result = service()
        .claim_seat(&team_subscription(0), &user_id("member-1"))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn invite_links_follow_source_type() {
    assert_eq!(
        invite_link(&bulk_coupon(5, 0), "https://learn.example.com").ok(),
        Some("https://learn.example.com/?code=coupon-1".to_owned())
    );
    assert_eq!(
        invite_link(&team_subscription(5), "https://learn.example.com/").ok(),
        Some("https://learn.example.com/team/invite/sub-1".to_owned())
    );
    assert!(invite_link(&team_subscription(5), "not a url").is_err());
}
