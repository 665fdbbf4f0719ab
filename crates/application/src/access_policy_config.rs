use std::collections::BTreeSet;

use lectern_domain::FreeContentPolicy;

/// Entitlement type name granted subscription-wide access by default.
pub const DEFAULT_SUBSCRIPTION_ENTITLEMENT: &str = "subscription_access";

/// Platform configuration consumed by the rule compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicyConfig {
    /// Entitlement type names granting read access to all content.
    pub subscription_entitlement_types: BTreeSet<String>,
    /// Entitlement type names that also carry a Discord role.
    pub discord_entitlement_types: BTreeSet<String>,
    /// Tutorials are readable without an email signup.
    pub email_not_required: bool,
}

impl Default for AccessPolicyConfig {
    fn default() -> Self {
        let defaults = BTreeSet::from([DEFAULT_SUBSCRIPTION_ENTITLEMENT.to_owned()]);
        Self {
            subscription_entitlement_types: defaults.clone(),
            discord_entitlement_types: defaults,
            email_not_required: false,
        }
    }
}

impl AccessPolicyConfig {
    /// Creates a configuration from explicit type name lists.
    #[must_use]
    pub fn new(
        subscription_entitlement_types: impl IntoIterator<Item = impl Into<String>>,
        discord_entitlement_types: impl IntoIterator<Item = impl Into<String>>,
        email_not_required: bool,
    ) -> Self {
        Self {
            subscription_entitlement_types: subscription_entitlement_types
                .into_iter()
                .map(Into::into)
                .collect(),
            discord_entitlement_types: discord_entitlement_types
                .into_iter()
                .map(Into::into)
                .collect(),
            email_not_required,
        }
    }

    /// Returns whether the entitlement type grants access to all content.
    #[must_use]
    pub fn grants_subscription_access(&self, entitlement_type_name: &str) -> bool {
        self.subscription_entitlement_types
            .contains(entitlement_type_name)
    }

    /// Returns whether the entitlement type carries a Discord role.
    #[must_use]
    pub fn grants_discord(&self, entitlement_type_name: &str) -> bool {
        self.discord_entitlement_types.contains(entitlement_type_name)
    }

    /// Returns the free-content settings.
    #[must_use]
    pub fn free_content_policy(&self) -> FreeContentPolicy {
        FreeContentPolicy {
            email_not_required: self.email_not_required,
        }
    }
}
