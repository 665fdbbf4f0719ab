//! Seat accounting ports and application service.
//!
//! Counts and claims seats of bulk coupons and team subscriptions. A user
//! holds at most one active claim per seat source; the repository enforces
//! that uniqueness so concurrent claims resolve to a single winner.

mod invite_link;
mod ports;
mod service;

pub use invite_link::invite_link;
pub use ports::SeatClaimRepository;
pub use service::{SeatClaimOutcome, SeatService};

#[cfg(test)]
mod tests;
