use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use lectern_application::{SeatClaimOutcome, invite_link};
use lectern_domain::UserId;

use crate::dto::{
    ClaimSeatRequest, ClaimSeatResponse, InviteLinkResponse, SeatClaimedResponse,
    SeatInfoResponse, SeatSourceRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn seat_info_handler(
    State(state): State<AppState>,
    Json(payload): Json<SeatSourceRequest>,
) -> ApiResult<Json<SeatInfoResponse>> {
    let seat_info = state.seat_service.seat_info(&payload.source).await?;

    Ok(Json(SeatInfoResponse::from(seat_info)))
}

pub async fn claim_seat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ClaimSeatRequest>,
) -> ApiResult<(StatusCode, Json<ClaimSeatResponse>)> {
    let user_id = UserId::new(payload.user_id)?;
    let outcome = state
        .seat_service
        .claim_seat(&payload.source, &user_id)
        .await?;

    let status = match outcome {
        SeatClaimOutcome::Claimed(_) => StatusCode::CREATED,
        SeatClaimOutcome::AlreadyClaimed => StatusCode::OK,
    };

    Ok((status, Json(ClaimSeatResponse::from(outcome))))
}

pub async fn seat_claimed_handler(
    State(state): State<AppState>,
    Json(payload): Json<ClaimSeatRequest>,
) -> ApiResult<Json<SeatClaimedResponse>> {
    let user_id = UserId::new(payload.user_id)?;
    let claimed = state
        .seat_service
        .has_user_claimed_seat(&payload.source.key(), &user_id)
        .await?;

    Ok(Json(SeatClaimedResponse { claimed }))
}

pub async fn invite_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<SeatSourceRequest>,
) -> ApiResult<Json<InviteLinkResponse>> {
    let url = invite_link(&payload.source, state.invite_base_url.as_str())?;

    Ok(Json(InviteLinkResponse { url }))
}
