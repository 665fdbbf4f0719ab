//! Access model, rule evaluator and leaf policies.

#![forbid(unsafe_code)]

mod ability;
mod condition;
mod content;
mod free_content;
mod hierarchy;
mod ids;
mod rule;
mod seat;
mod security;
mod viewer;

pub use ability::{Ability, SubjectAttributes};
pub use condition::{ConditionAttribute, ConditionClause, ConditionOperator, ConditionPredicate};
pub use content::{ResourceContext, ResourceFields, ResourceRef, ResourceState, ResourceType, Visibility};
pub use free_content::{FreeContentContext, FreeContentPolicy};
pub use hierarchy::ResourceHierarchy;
pub use ids::{ResourceId, UserId};
pub use rule::{Rule, RuleSet};
pub use seat::{SeatClaim, SeatInfo, SeatSource, SeatSourceKey, SeatSourceType, has_available_seats};
pub use security::{Action, SubjectType};
pub use viewer::{
    ADMIN_ROLE, BulkCoupon, CONTRIBUTOR_ROLE, Entitlement, EntitlementMetadata, EntitlementType,
    Purchase, PurchaseStatus, Role, RoleSet, Subscriber, Subscription, TeamSubscription,
    ViewerContext, ViewerUser,
};
