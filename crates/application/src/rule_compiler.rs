//! Compiles viewer facts into the allow-rules of one request.
//!
//! Every producer looks at an independent slice of the viewer context and
//! appends zero or more rules. Producers never remove rules, so the order in
//! which they run does not change any decision. Records that fail structural
//! validation are logged and skipped; compilation itself cannot fail.

mod entitlements;
mod purchases;

use chrono::{DateTime, Utc};
use lectern_domain::{
    Ability, Action, ConditionAttribute, ConditionClause, ConditionPredicate, FreeContentContext,
    ResourceHierarchy, ResourceState, RoleSet, Rule, RuleSet, SubjectType, ViewerContext,
    Visibility,
};
use tracing::debug;

use crate::AccessPolicyConfig;

/// Pure compiler from a viewer context to a rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleCompiler {
    config: AccessPolicyConfig,
}

impl RuleCompiler {
    /// Creates a compiler from platform configuration.
    #[must_use]
    pub fn new(config: AccessPolicyConfig) -> Self {
        Self { config }
    }

    /// Returns the platform configuration.
    #[must_use]
    pub fn config(&self) -> &AccessPolicyConfig {
        &self.config
    }

    /// Compiles rules against the current clock.
    #[must_use]
    pub fn compile(&self, context: &ViewerContext) -> RuleSet {
        self.compile_at(context, Utc::now())
    }

    /// Compiles rules, treating `now` as the current time for expirations.
    #[must_use]
    pub fn compile_at(&self, context: &ViewerContext, now: DateTime<Utc>) -> RuleSet {
        let roles = context.role_set();
        let mut rules = RuleSet::new();

        // Administrators already hold every permission.
        if roles.is_admin() {
            rules.push(Rule::can(Action::Manage, SubjectType::All));
            debug!(
                user_id = user_id_field(context),
                "compiled administrator access rules"
            );
            return rules;
        }

        contributor_rules(context, &roles, &mut rules);
        self_management_rules(context, &mut rules);
        rules.push(published_content_rule());
        purchases::purchase_rules(context, &mut rules);
        purchases::team_rules(context, &mut rules);
        entitlements::entitlement_rules(&self.config, context, now, &mut rules);
        self.free_content_rules(context, &mut rules);

        debug!(
            user_id = user_id_field(context),
            country = %context.country,
            rule_count = rules.len(),
            "compiled access rules"
        );

        rules
    }

    /// Compiles rules and binds them to the evaluator.
    #[must_use]
    pub fn ability_for(&self, context: &ViewerContext) -> Ability {
        Ability::new(self.compile(context))
    }

    fn free_content_rules(&self, context: &ViewerContext, rules: &mut RuleSet) {
        let Some(resource) = context.resource.as_ref() else {
            return;
        };

        let hierarchy = ResourceHierarchy::from_viewer(context);
        let free_content = FreeContentContext {
            hierarchy: &hierarchy,
            is_solution: context.is_solution,
            has_viewer_identity: context.has_viewer_identity(),
        };

        if self
            .config
            .free_content_policy()
            .is_freely_visible(resource, free_content)
        {
            rules.push(Rule::can(Action::Read, SubjectType::Content));
        }
    }
}

fn contributor_rules(context: &ViewerContext, roles: &RoleSet, rules: &mut RuleSet) {
    let Some(user) = context.user.as_ref() else {
        return;
    };
    if !roles.is_contributor() {
        return;
    }

    rules.push(Rule::can(Action::Create, SubjectType::Content));
    rules.push(
        Rule::can(Action::Manage, SubjectType::Content).when(ConditionPredicate::single(
            ConditionClause::eq(ConditionAttribute::CreatedById, user.id.as_str()),
        )),
    );
}

fn self_management_rules(context: &ViewerContext, rules: &mut RuleSet) {
    let Some(user) = context.user.as_ref() else {
        return;
    };

    rules.push(
        Rule::can(Action::Read, SubjectType::User)
            .with_action(Action::Update)
            .when(ConditionPredicate::single(ConditionClause::eq(
                ConditionAttribute::Id,
                user.id.as_str(),
            ))),
    );
}

fn published_content_rule() -> Rule {
    let condition = ConditionPredicate::single(ConditionClause::is_in(
        ConditionAttribute::State,
        [
            ResourceState::Review.as_str(),
            ResourceState::Published.as_str(),
        ],
    ))
    .and(ConditionClause::eq(
        ConditionAttribute::Visibility,
        Visibility::Public.as_str(),
    ));

    Rule::can(Action::Read, SubjectType::Content).when(condition)
}

fn user_id_field(context: &ViewerContext) -> &str {
    context
        .user
        .as_ref()
        .map(|user| user.id.as_str())
        .unwrap_or("anonymous")
}

#[cfg(test)]
mod tests;
