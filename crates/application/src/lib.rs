//! Application services and ports.

#![forbid(unsafe_code)]

mod access_policy_config;
mod record_decoding;
mod rule_compiler;
mod seat_service;

pub use access_policy_config::{AccessPolicyConfig, DEFAULT_SUBSCRIPTION_ENTITLEMENT};
pub use record_decoding::decode_records;
pub use rule_compiler::RuleCompiler;
pub use seat_service::{SeatClaimOutcome, SeatClaimRepository, SeatService, invite_link};
