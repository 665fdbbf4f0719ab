use lectern_domain::{
    Action, Purchase, PurchaseStatus, Rule, RuleSet, SeatInfo, SubjectType, TeamSubscription,
    ViewerContext,
};
use tracing::warn;

/// Outcome of looking at a single purchase for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PurchaseGrant {
    Valid,
    Invalid,
    RegionRestricted,
}

/// Read access from purchases that apply to the request.
pub(super) fn purchase_rules(context: &ViewerContext, rules: &mut RuleSet) {
    let mut has_valid = false;
    let mut has_region_restricted = false;

    for purchase in well_formed_purchases(context) {
        if !applies_to_request(purchase, context) {
            continue;
        }

        match classify(purchase, &context.country) {
            PurchaseGrant::Valid => has_valid = true,
            PurchaseGrant::RegionRestricted => has_region_restricted = true,
            PurchaseGrant::Invalid => {}
        }
    }

    if has_valid {
        rules.push(Rule::can(Action::Read, SubjectType::Content));
    }
    if has_region_restricted {
        rules.push(Rule::can(Action::Read, SubjectType::RegionRestriction));
    }
}

/// Invoice and team management signals from purchases and team subscriptions.
pub(super) fn team_rules(context: &ViewerContext, rules: &mut RuleSet) {
    let mut has_charge = false;
    let mut has_team = false;
    let mut can_invite = false;

    for purchase in well_formed_purchases(context) {
        has_charge |= purchase.merchant_charge_id.is_some();
        if let Some(bulk_coupon) = &purchase.bulk_coupon {
            has_team = true;
            can_invite |= SeatInfo::for_bulk_coupon(bulk_coupon).has_available_seats();
        }
    }

    for subscription in well_formed_team_subscriptions(context) {
        if subscription.is_team() {
            has_team = true;
            can_invite |= SeatInfo::for_team_subscription(subscription).has_available_seats();
        }
    }

    if has_charge {
        rules.push(Rule::can(Action::Read, SubjectType::Invoice));
    }
    if has_team {
        rules.push(Rule::can(Action::Read, SubjectType::Team));
    }
    if can_invite {
        rules.push(Rule::can(Action::Invite, SubjectType::Team));
    }
}

fn classify(purchase: &Purchase, request_country: &str) -> PurchaseGrant {
    // Bulk purchases are redeemed by teammates, not used by the buyer.
    if purchase.bulk_coupon.is_some() {
        return PurchaseGrant::Invalid;
    }

    match &purchase.status {
        PurchaseStatus::Valid => PurchaseGrant::Valid,
        PurchaseStatus::Restricted => {
            let same_country = purchase
                .country
                .as_deref()
                .is_some_and(|country| country.trim().eq_ignore_ascii_case(request_country.trim()));
            if same_country {
                PurchaseGrant::Valid
            } else {
                PurchaseGrant::RegionRestricted
            }
        }
        PurchaseStatus::Other(_) => PurchaseGrant::Invalid,
    }
}

/// Module-scoped requests only count purchases of that module.
fn applies_to_request(purchase: &Purchase, context: &ViewerContext) -> bool {
    if let Some(module) = context
        .module
        .as_ref()
        .filter(|module| !module.resource_products.is_empty())
    {
        return purchase
            .product_id
            .as_ref()
            .is_some_and(|product_id| module.resource_products.contains(product_id));
    }

    if let Some(resource) = context
        .resource
        .as_ref()
        .filter(|_| !context.all_module_resource_ids.is_empty())
    {
        let is_module = context
            .module
            .as_ref()
            .is_some_and(|module| module.id == resource.id);
        return is_module || context.all_module_resource_ids.contains(&resource.id);
    }

    true
}

fn well_formed_purchases(context: &ViewerContext) -> impl Iterator<Item = &Purchase> {
    context
        .purchases
        .iter()
        .filter(|purchase| match purchase.validate() {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    purchase_id = purchase.id.as_deref().unwrap_or("<unknown>"),
                    error = %error,
                    "skipping malformed purchase"
                );
                false
            }
        })
}

fn well_formed_team_subscriptions(
    context: &ViewerContext,
) -> impl Iterator<Item = &TeamSubscription> {
    context
        .team_subscriptions
        .iter()
        .filter(|subscription| match subscription.validate() {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    subscription_id = %subscription.subscription_id,
                    error = %error,
                    "skipping malformed team subscription"
                );
                false
            }
        })
}
