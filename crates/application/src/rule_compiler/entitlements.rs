use chrono::{DateTime, Utc};
use lectern_domain::{
    Action, ConditionAttribute, ConditionClause, ConditionPredicate, Rule, RuleSet, SubjectType,
    ViewerContext,
};
use tracing::{debug, warn};

use crate::AccessPolicyConfig;

/// Subscription, Discord and content-scoped grants from active entitlements.
pub(super) fn entitlement_rules(
    config: &AccessPolicyConfig,
    context: &ViewerContext,
    now: DateTime<Utc>,
    rules: &mut RuleSet,
) {
    let Some(user) = context.user.as_ref() else {
        return;
    };

    let mut grants_subscription = false;
    let mut grants_discord = false;

    for entitlement in user
        .entitlements
        .iter()
        .filter(|entitlement| entitlement.is_active(now))
    {
        let metadata = match entitlement.decode_metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(
                    user_id = %user.id,
                    entitlement_type = %entitlement.entitlement_type,
                    error = %error,
                    "skipping malformed entitlement"
                );
                continue;
            }
        };

        // Types missing from the platform list are matched by their raw value.
        let type_name = match context.entitlement_type(&entitlement.entitlement_type) {
            Some(entitlement_type) => entitlement_type.name.as_str(),
            None => {
                debug!(
                    user_id = %user.id,
                    entitlement_type = %entitlement.entitlement_type,
                    "entitlement type is not listed, matching raw value"
                );
                entitlement.entitlement_type.as_str()
            }
        };
        // Discord is only granted on top of subscription access.
        let subscription_access = config.grants_subscription_access(type_name);
        grants_subscription |= subscription_access;
        grants_discord |= subscription_access && config.grants_discord(type_name);

        let content_ids = metadata.content_ids.unwrap_or_default();
        if !content_ids.is_empty() {
            rules.push(
                Rule::can(Action::Read, SubjectType::Content).when(ConditionPredicate::single(
                    ConditionClause::is_in(
                        ConditionAttribute::Id,
                        content_ids.iter().map(|content_id| content_id.as_str()),
                    ),
                )),
            );
        }
    }

    if grants_subscription {
        rules.push(Rule::can(Action::Read, SubjectType::Content));
    }
    if grants_discord {
        rules.push(Rule::can(Action::Read, SubjectType::Discord));
    }
}
