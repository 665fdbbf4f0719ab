mod cors;

use axum::Router;
use axum::routing::{get, post};
use lectern_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

use self::cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let ability_routes = Router::new()
        .route(
            "/api/abilities",
            post(handlers::abilities::compile_abilities_handler),
        )
        .route(
            "/api/abilities/check",
            post(handlers::abilities::check_ability_handler),
        );

    let seat_routes = Router::new()
        .route("/api/seats/info", post(handlers::seats::seat_info_handler))
        .route("/api/seats/claim", post(handlers::seats::claim_seat_handler))
        .route(
            "/api/seats/claimed",
            post(handlers::seats::seat_claimed_handler),
        )
        .route(
            "/api/seats/invite-link",
            post(handlers::seats::invite_link_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(ability_routes)
        .merge(seat_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
