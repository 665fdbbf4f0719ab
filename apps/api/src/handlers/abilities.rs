use axum::Json;
use axum::extract::State;

use lectern_domain::{Action, SubjectType, ViewerContext};
use tracing::debug;

use crate::dto::{AbilityCheckRequest, AbilityCheckResponse, AbilityRequest, AbilityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn compile_abilities_handler(
    State(state): State<AppState>,
    Json(payload): Json<AbilityRequest>,
) -> ApiResult<Json<AbilityResponse>> {
    let context = ViewerContext::try_from(payload.context)?;
    let rules = state.rule_compiler.compile(&context);

    Ok(Json(AbilityResponse { rules }))
}

pub async fn check_ability_handler(
    State(state): State<AppState>,
    Json(payload): Json<AbilityCheckRequest>,
) -> ApiResult<Json<AbilityCheckResponse>> {
    let action = payload.action.parse::<Action>()?;
    let subject = SubjectType::from_transport(payload.subject.as_str())?;
    let context = ViewerContext::try_from(payload.context)?;

    let instance = match payload.instance {
        Some(instance) => Some(instance),
        None if payload.check_resource => context
            .resource
            .as_ref()
            .map(|resource| resource.subject_attributes()),
        None => None,
    };

    let allowed = state
        .rule_compiler
        .ability_for(&context)
        .can(action, subject, instance.as_ref());
    debug!(%action, %subject, allowed, "checked ability");

    Ok(Json(AbilityCheckResponse { allowed }))
}
