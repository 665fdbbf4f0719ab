use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Action, ConditionAttribute, RuleSet, SubjectType};

/// Attribute values of a concrete subject instance.
///
/// Missing values never satisfy a condition clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttributes {
    /// Instance id.
    #[serde(default)]
    pub id: Option<String>,
    /// Author id.
    #[serde(default)]
    pub created_by_id: Option<String>,
    /// Editorial state.
    #[serde(default)]
    pub state: Option<String>,
    /// Audience visibility.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Country code.
    #[serde(default)]
    pub country: Option<String>,
}

impl SubjectAttributes {
    /// Creates attributes carrying only an id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Returns the value of one attribute.
    #[must_use]
    pub fn get(&self, attribute: ConditionAttribute) -> Option<&str> {
        match attribute {
            ConditionAttribute::Id => self.id.as_deref(),
            ConditionAttribute::CreatedById => self.created_by_id.as_deref(),
            ConditionAttribute::State => self.state.as_deref(),
            ConditionAttribute::Visibility => self.visibility.as_deref(),
            ConditionAttribute::Country => self.country.as_deref(),
        }
    }
}

/// A rule set bound to the evaluator.
///
/// Built per request and dropped afterwards. The evaluator knows nothing
/// about the policy that produced the rules: a request is allowed when at
/// least one rule allows it, and there is no deny rule.
#[derive(Debug, Clone, Default)]
pub struct Ability {
    rules: RuleSet,
}

impl Ability {
    /// Binds a rule set.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Returns whether the action is allowed on the subject.
    #[must_use]
    pub fn can(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectAttributes>,
    ) -> bool {
        self.rules.allows(action, subject, instance)
    }

    /// Logical negation of [`Ability::can`].
    #[must_use]
    pub fn cannot(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectAttributes>,
    ) -> bool {
        !self.can(action, subject, instance)
    }

    /// Ensures the action is allowed on the subject.
    pub fn require(
        &self,
        action: Action,
        subject: SubjectType,
        instance: Option<&SubjectAttributes>,
    ) -> AppResult<()> {
        if self.can(action, subject, instance) {
            return Ok(());
        }

        let target = instance
            .and_then(|attributes| attributes.id.as_deref())
            .map(|id| format!("{subject} '{id}'"))
            .unwrap_or_else(|| subject.to_string());
        Err(AppError::Forbidden(format!(
            "action '{action}' is not allowed on {target}"
        )))
    }

    /// Returns the bound rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Releases the bound rules.
    #[must_use]
    pub fn into_rules(self) -> RuleSet {
        self.rules
    }
}

impl From<RuleSet> for Ability {
    fn from(value: RuleSet) -> Self {
        Self::new(value)
    }
}
