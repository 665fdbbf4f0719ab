use lectern_application::{RuleCompiler, SeatService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rule_compiler: RuleCompiler,
    pub seat_service: SeatService,
    pub invite_base_url: String,
}
