//! Transport types of the HTTP API.

mod abilities;
mod seats;

use serde::Serialize;
use ts_rs::TS;

pub use abilities::{
    AbilityCheckRequest, AbilityCheckResponse, AbilityRequest, AbilityResponse,
    ViewerContextRequest, ViewerUserRequest,
};
pub use seats::{
    ClaimSeatRequest, ClaimSeatResponse, ClaimSeatStatus, InviteLinkResponse,
    SeatClaimedResponse, SeatInfoResponse, SeatSourceRequest,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
