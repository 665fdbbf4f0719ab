use lectern_application::SeatClaimOutcome;
use lectern_domain::{SeatInfo, SeatSource};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload naming a seat source.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seat-source-request.ts"
)]
pub struct SeatSourceRequest {
    #[ts(type = "{ sourceType: \"bulk_coupon\", id: string, maxUses: number, usedCount: number } | { sourceType: \"subscription\", id: string, ownerId: string, seats: number, status?: string }")]
    pub source: SeatSource,
}

/// Seat totals of a source.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seat-info-response.ts"
)]
pub struct SeatInfoResponse {
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub used: u64,
    #[ts(type = "number")]
    pub available: u64,
    #[ts(type = "number")]
    pub overage: u64,
}

impl From<SeatInfo> for SeatInfoResponse {
    fn from(value: SeatInfo) -> Self {
        Self {
            total: value.total(),
            used: value.used(),
            available: value.available(),
            overage: value.overage(),
        }
    }
}

/// Incoming payload for claiming or looking up a seat.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claim-seat-request.ts"
)]
pub struct ClaimSeatRequest {
    #[ts(type = "{ sourceType: \"bulk_coupon\", id: string, maxUses: number, usedCount: number } | { sourceType: \"subscription\", id: string, ownerId: string, seats: number, status?: string }")]
    pub source: SeatSource,
    pub user_id: String,
}

/// Outcome of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claim-seat-status.ts"
)]
pub enum ClaimSeatStatus {
    Claimed,
    AlreadyClaimed,
}

/// Claim response payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claim-seat-response.ts"
)]
pub struct ClaimSeatResponse {
    pub status: ClaimSeatStatus,
    pub claim_id: Option<String>,
}

impl From<SeatClaimOutcome> for ClaimSeatResponse {
    fn from(value: SeatClaimOutcome) -> Self {
        match value {
            SeatClaimOutcome::Claimed(claim) => Self {
                status: ClaimSeatStatus::Claimed,
                claim_id: Some(claim.id.to_string()),
            },
            SeatClaimOutcome::AlreadyClaimed => Self {
                status: ClaimSeatStatus::AlreadyClaimed,
                claim_id: None,
            },
        }
    }
}

/// Whether a user holds a seat on a source.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seat-claimed-response.ts"
)]
pub struct SeatClaimedResponse {
    pub claimed: bool,
}

/// Shareable invite link of a source.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invite-link-response.ts"
)]
pub struct InviteLinkResponse {
    pub url: String,
}
