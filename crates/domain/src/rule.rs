use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Action, ConditionPredicate, SubjectAttributes, SubjectType};

/// One allow-grant: actions on a subject type, optionally narrowed by a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct Rule {
    actions: Vec<Action>,
    subject: SubjectType,
    condition: Option<ConditionPredicate>,
}

impl Rule {
    /// Creates a validated rule.
    pub fn new(
        actions: Vec<Action>,
        subject: SubjectType,
        condition: Option<ConditionPredicate>,
    ) -> AppResult<Self> {
        if actions.is_empty() {
            return Err(AppError::Validation(
                "rules must grant at least one action".to_owned(),
            ));
        }

        Ok(Self {
            actions,
            subject,
            condition,
        })
    }

    /// Creates an unconditional rule granting one action.
    #[must_use]
    pub fn can(action: Action, subject: SubjectType) -> Self {
        Self {
            actions: vec![action],
            subject,
            condition: None,
        }
    }

    /// Adds another granted action.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        self
    }

    /// Narrows the rule to instances matching the predicate.
    #[must_use]
    pub fn when(mut self, condition: ConditionPredicate) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Returns granted actions.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the subject type the rule is written against.
    #[must_use]
    pub fn subject(&self) -> SubjectType {
        self.subject
    }

    /// Returns the optional condition.
    #[must_use]
    pub fn condition(&self) -> Option<&ConditionPredicate> {
        self.condition.as_ref()
    }

    /// Returns whether this rule allows the request.
    #[must_use]
    pub fn allows(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectAttributes>,
    ) -> bool {
        self.actions.iter().any(|granted| granted.covers(action))
            && self.subject.covers(subject)
            && self
                .condition
                .as_ref()
                .is_none_or(|condition| condition.matches(instance))
    }
}

#[derive(Serialize, Deserialize)]
struct RuleRecord {
    actions: Vec<Action>,
    subject: SubjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conditions: Option<ConditionPredicate>,
}

impl TryFrom<RuleRecord> for Rule {
    type Error = AppError;

    fn try_from(value: RuleRecord) -> Result<Self, Self::Error> {
        Self::new(value.actions, value.subject, value.conditions)
    }
}

impl From<Rule> for RuleRecord {
    fn from(value: Rule) -> Self {
        Self {
            actions: value.actions,
            subject: value.subject,
            conditions: value.condition,
        }
    }
}

/// Unordered collection of allow-rules, combined with OR semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    /// Returns the rules.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.0
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether any rule allows the request.
    #[must_use]
    pub fn allows(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectAttributes>,
    ) -> bool {
        self.0
            .iter()
            .any(|rule| rule.allows(action, subject, instance))
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
