//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_seat_claim_repository;
mod postgres_seat_claim_repository;

pub use in_memory_seat_claim_repository::InMemorySeatClaimRepository;
pub use postgres_seat_claim_repository::PostgresSeatClaimRepository;
