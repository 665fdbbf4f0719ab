//! Facts about the requester, assembled by collaborators outside the policy.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ResourceContext, ResourceId, UserId};

/// Role name granting full access.
pub const ADMIN_ROLE: &str = "admin";

/// Role name granting authoring access.
pub const CONTRIBUTOR_ROLE: &str = "contributor";

/// Role attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Free-form role metadata.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Role {
    /// Creates a role without metadata.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Value::Null,
        }
    }
}

/// Normalized set of role names held by a viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Normalizes raw roles into a set of trimmed, lowercase names.
    #[must_use]
    pub fn from_roles(roles: &[Role]) -> Self {
        Self(
            roles
                .iter()
                .map(|role| role.name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Returns whether the set holds the role name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns whether the viewer is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.contains(ADMIN_ROLE)
    }

    /// Returns whether the viewer is a contributor.
    #[must_use]
    pub fn is_contributor(&self) -> bool {
        self.contains(CONTRIBUTOR_ROLE)
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Entitlement type configured on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementType {
    /// Entitlement type id referenced by entitlements.
    pub id: String,
    /// Human-assigned type name, matched against policy configuration.
    pub name: String,
}

/// Standing grant held by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Entitlement type id.
    #[serde(rename = "type")]
    pub entitlement_type: String,
    /// Expiry; `None` never expires.
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// Open metadata object, see [`EntitlementMetadata`].
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Entitlement {
    /// Returns whether the entitlement is active at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_none_or(|expires| expires > now)
    }

    /// Decodes the metadata object into its known fields.
    pub fn decode_metadata(&self) -> AppResult<EntitlementMetadata> {
        match &self.metadata {
            Value::Null => Ok(EntitlementMetadata::default()),
            Value::Object(_) => serde_json::from_value(self.metadata.clone()).map_err(|error| {
                AppError::Validation(format!(
                    "invalid metadata for entitlement type '{}': {error}",
                    self.entitlement_type
                ))
            }),
            _ => Err(AppError::Validation(format!(
                "metadata for entitlement type '{}' must be an object",
                self.entitlement_type
            ))),
        }
    }
}

/// Known entitlement metadata fields. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementMetadata {
    /// Content the entitlement is scoped to.
    #[serde(default)]
    pub content_ids: Option<Vec<ResourceId>>,
    /// Discord role granted alongside the entitlement.
    #[serde(default)]
    pub discord_role_id: Option<String>,
    /// Subscription the entitlement was issued from.
    #[serde(default)]
    pub subscription_id: Option<String>,
}

/// Purchase status as recorded by the billing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurchaseStatus {
    /// Usable everywhere.
    Valid,
    /// Usable only in the country it was bought in.
    Restricted,
    /// Refunded, disputed, or any other non-granting status.
    Other(String),
}

impl PurchaseStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Valid => "Valid",
            Self::Restricted => "Restricted",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for PurchaseStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Valid" => Self::Valid,
            "Restricted" => Self::Restricted,
            _ => Self::Other(value),
        }
    }
}

impl From<PurchaseStatus> for String {
    fn from(value: PurchaseStatus) -> Self {
        match value {
            PurchaseStatus::Other(value) => value,
            other => other.as_str().to_owned(),
        }
    }
}

impl Display for PurchaseStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Pool of redeemable seats attached to a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCoupon {
    /// Coupon id.
    pub id: String,
    /// Seat ceiling.
    pub max_uses: i64,
    /// Seats already redeemed.
    pub used_count: i64,
}

impl BulkCoupon {
    /// Checks structural invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation(
                "bulk coupon id must not be empty".to_owned(),
            ));
        }
        if self.max_uses < 0 || self.used_count < 0 {
            return Err(AppError::Validation(format!(
                "bulk coupon '{}' has negative seat counts",
                self.id
            )));
        }

        Ok(())
    }
}

/// One purchase made by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Purchase id.
    #[serde(default)]
    pub id: Option<String>,
    /// Billing status.
    pub status: PurchaseStatus,
    /// Country the purchase was made in.
    #[serde(default)]
    pub country: Option<String>,
    /// Product the purchase is for.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Seat pool when bought for a team.
    #[serde(default)]
    pub bulk_coupon: Option<BulkCoupon>,
    /// Payment provider charge id.
    #[serde(default)]
    pub merchant_charge_id: Option<String>,
}

impl Purchase {
    /// Creates a purchase with only a status.
    #[must_use]
    pub fn with_status(status: PurchaseStatus) -> Self {
        Self {
            id: None,
            status,
            country: None,
            product_id: None,
            bulk_coupon: None,
            merchant_charge_id: None,
        }
    }

    /// Checks structural invariants.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(bulk_coupon) = &self.bulk_coupon {
            bulk_coupon.validate()?;
        }
        if self.status == PurchaseStatus::Restricted
            && self
                .country
                .as_deref()
                .is_none_or(|country| country.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "restricted purchase '{}' has no country",
                self.id.as_deref().unwrap_or("<unknown>")
            )));
        }

        Ok(())
    }
}

/// Anonymous subscriber identity (newsletter signup without an account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Subscriber id.
    #[serde(default)]
    pub id: Option<String>,
    /// Subscriber email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Recurring subscription that may carry team seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// Owning user.
    pub owner_id: UserId,
    /// Seat count, at least one.
    pub seats: i64,
    /// Billing status.
    #[serde(default)]
    pub status: String,
}

impl Subscription {
    /// Checks structural invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation(
                "subscription id must not be empty".to_owned(),
            ));
        }
        if self.seats < 1 {
            return Err(AppError::Validation(format!(
                "subscription '{}' must have at least one seat",
                self.id
            )));
        }

        Ok(())
    }

    /// Returns whether the subscription has seats to share.
    #[must_use]
    pub fn is_team(&self) -> bool {
        self.seats > 1
    }
}

/// Seat summary of a team subscription the viewer owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSubscription {
    /// Subscription id.
    pub subscription_id: String,
    /// Seat count.
    pub total_seats: i64,
    /// Claimed seats.
    pub used_seats: i64,
}

impl TeamSubscription {
    /// Checks structural invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.total_seats < 1 || self.used_seats < 0 {
            return Err(AppError::Validation(format!(
                "team subscription '{}' has invalid seat counts",
                self.subscription_id
            )));
        }

        Ok(())
    }

    /// Returns whether the subscription has seats to share.
    #[must_use]
    pub fn is_team(&self) -> bool {
        self.total_seats > 1
    }
}

/// Authenticated user facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerUser {
    /// User id.
    pub id: UserId,
    /// Assigned roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Active entitlements.
    #[serde(default)]
    pub entitlements: Vec<Entitlement>,
}

impl ViewerUser {
    /// Creates a user without roles or entitlements.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            roles: Vec::new(),
            entitlements: Vec::new(),
        }
    }
}

/// Everything the rule compiler knows about one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    /// Signed-in user, if any.
    #[serde(default)]
    pub user: Option<ViewerUser>,
    /// Country resolved from the request.
    #[serde(default)]
    pub country: String,
    /// Entitlement types configured on the platform.
    #[serde(default)]
    pub entitlement_types: Vec<EntitlementType>,
    /// Purchases relevant to the request.
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    /// Anonymous subscriber identity.
    #[serde(default)]
    pub subscriber: Option<Subscriber>,
    /// Module (workshop) the resource belongs to.
    #[serde(default)]
    pub module: Option<ResourceContext>,
    /// Section the resource belongs to.
    #[serde(default)]
    pub section: Option<ResourceContext>,
    /// Resource being checked.
    #[serde(default)]
    pub resource: Option<ResourceContext>,
    /// Marks the resource as an exercise solution.
    #[serde(default)]
    pub is_solution: bool,
    /// Every resource id reachable from the module.
    #[serde(default)]
    pub all_module_resource_ids: Vec<ResourceId>,
    /// Team subscriptions the viewer owns.
    #[serde(default)]
    pub team_subscriptions: Vec<TeamSubscription>,
}

impl ViewerContext {
    /// Creates an anonymous context for a country.
    #[must_use]
    pub fn anonymous(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            ..Self::default()
        }
    }

    /// Returns the normalized roles of the signed-in user.
    #[must_use]
    pub fn role_set(&self) -> RoleSet {
        self.user
            .as_ref()
            .map(|user| RoleSet::from_roles(&user.roles))
            .unwrap_or_default()
    }

    /// Returns whether a user or subscriber identity is present.
    #[must_use]
    pub fn has_viewer_identity(&self) -> bool {
        self.user.is_some() || self.subscriber.is_some()
    }

    /// Looks up a configured entitlement type by id.
    #[must_use]
    pub fn entitlement_type(&self, id: &str) -> Option<&EntitlementType> {
        self.entitlement_types
            .iter()
            .find(|entitlement_type| entitlement_type.id == id)
    }
}
