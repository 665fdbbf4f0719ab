//! Restricted condition grammar attached to access rules.
//!
//! Conditions are a conjunction of clauses. Each clause tests one resource
//! attribute with one of three operators (`$eq`, `$in`, `$lte`). The grammar
//! is closed: decoding a condition that names any other attribute or operator
//! fails instead of being interpreted.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SubjectAttributes;

/// Resource attributes a condition may test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionAttribute {
    /// Resource id.
    Id,
    /// Author id.
    CreatedById,
    /// Editorial state.
    State,
    /// Audience visibility.
    Visibility,
    /// Country code.
    Country,
}

impl ConditionAttribute {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CreatedById => "createdById",
            Self::State => "state",
            Self::Visibility => "visibility",
            Self::Country => "country",
        }
    }
}

impl Display for ConditionAttribute {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ConditionAttribute {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "id" => Ok(Self::Id),
            "createdById" => Ok(Self::CreatedById),
            "state" => Ok(Self::State),
            "visibility" => Ok(Self::Visibility),
            "country" => Ok(Self::Country),
            _ => Err(AppError::Validation(format!(
                "unsupported condition attribute '{value}'"
            ))),
        }
    }
}

/// Comparison applied to one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOperator {
    /// Attribute equals the value.
    Eq(String),
    /// Attribute is one of the values.
    In(Vec<String>),
    /// Attribute is at most the value.
    Lte(String),
}

impl ConditionOperator {
    /// Returns the transport key of the operator.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq(_) => "$eq",
            Self::In(_) => "$in",
            Self::Lte(_) => "$lte",
        }
    }

    /// Tests an attribute value against the operator.
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Eq(expected) => actual == expected,
            Self::In(expected) => expected.iter().any(|value| value == actual),
            Self::Lte(bound) => compare_values(actual, bound) != Ordering::Greater,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Eq(value) | Self::Lte(value) => Value::String(value.clone()),
            Self::In(values) => Value::Array(values.iter().cloned().map(Value::String).collect()),
        }
    }

    fn from_json(key: &str, value: &Value) -> AppResult<Self> {
        match key {
            "$eq" => Ok(Self::Eq(scalar_value(value)?)),
            "$lte" => Ok(Self::Lte(scalar_value(value)?)),
            "$in" => {
                let Value::Array(values) = value else {
                    return Err(AppError::Validation(
                        "condition operator '$in' expects an array".to_owned(),
                    ));
                };
                let values = values
                    .iter()
                    .map(scalar_value)
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(Self::In(values))
            }
            _ => Err(AppError::Validation(format!(
                "unsupported condition operator '{key}'"
            ))),
        }
    }
}

/// One attribute test inside a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionClause {
    attribute: ConditionAttribute,
    operator: ConditionOperator,
}

impl ConditionClause {
    /// Creates a clause from an attribute and operator.
    #[must_use]
    pub fn new(attribute: ConditionAttribute, operator: ConditionOperator) -> Self {
        Self {
            attribute,
            operator,
        }
    }

    /// Creates an equality clause.
    #[must_use]
    pub fn eq(attribute: ConditionAttribute, value: impl Into<String>) -> Self {
        Self::new(attribute, ConditionOperator::Eq(value.into()))
    }

    /// Creates a membership clause.
    #[must_use]
    pub fn is_in<I, S>(attribute: ConditionAttribute, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            attribute,
            ConditionOperator::In(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Creates an upper-bound clause.
    #[must_use]
    pub fn lte(attribute: ConditionAttribute, bound: impl Into<String>) -> Self {
        Self::new(attribute, ConditionOperator::Lte(bound.into()))
    }

    /// Returns the tested attribute.
    #[must_use]
    pub fn attribute(&self) -> ConditionAttribute {
        self.attribute
    }

    /// Returns the clause operator.
    #[must_use]
    pub fn operator(&self) -> &ConditionOperator {
        &self.operator
    }

    fn matches(&self, attributes: &SubjectAttributes) -> bool {
        attributes
            .get(self.attribute)
            .is_some_and(|actual| self.operator.matches(actual))
    }
}

/// Conjunction of clauses restricting where a rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ConditionPredicate {
    clauses: Vec<ConditionClause>,
}

impl ConditionPredicate {
    /// Creates a validated predicate.
    ///
    /// A predicate needs at least one clause and may test each attribute once.
    pub fn new(clauses: Vec<ConditionClause>) -> AppResult<Self> {
        if clauses.is_empty() {
            return Err(AppError::Validation(
                "conditions must include at least one clause".to_owned(),
            ));
        }

        for (index, clause) in clauses.iter().enumerate() {
            if clauses[..index]
                .iter()
                .any(|previous| previous.attribute == clause.attribute)
            {
                return Err(AppError::Validation(format!(
                    "condition attribute '{}' appears more than once",
                    clause.attribute
                )));
            }
        }

        Ok(Self { clauses })
    }

    /// Creates a single-clause predicate.
    #[must_use]
    pub fn single(clause: ConditionClause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }

    /// Adds a clause to the conjunction.
    ///
    /// A clause on an attribute the predicate already tests replaces the
    /// earlier one.
    #[must_use]
    pub fn and(mut self, clause: ConditionClause) -> Self {
        self.clauses
            .retain(|existing| existing.attribute != clause.attribute);
        self.clauses.push(clause);
        self
    }

    /// Returns predicate clauses.
    #[must_use]
    pub fn clauses(&self) -> &[ConditionClause] {
        &self.clauses
    }

    /// Evaluates the predicate against an instance.
    ///
    /// Without an instance there is nothing to test, so the predicate fails.
    #[must_use]
    pub fn matches(&self, instance: Option<&SubjectAttributes>) -> bool {
        instance.is_some_and(|attributes| {
            self.clauses
                .iter()
                .all(|clause| clause.matches(attributes))
        })
    }

    /// Encodes the predicate as a `{ attribute: { operator: value } }` object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for clause in &self.clauses {
            let mut operator = Map::new();
            operator.insert(clause.operator.key().to_owned(), clause.operator.to_json());
            object.insert(clause.attribute.as_str().to_owned(), Value::Object(operator));
        }

        Value::Object(object)
    }

    /// Decodes a predicate, rejecting anything outside the supported grammar.
    pub fn from_json(value: &Value) -> AppResult<Self> {
        let Value::Object(object) = value else {
            return Err(AppError::Validation(
                "conditions must be a JSON object".to_owned(),
            ));
        };

        let mut clauses = Vec::with_capacity(object.len());
        for (attribute, operator) in object {
            let attribute = ConditionAttribute::from_str(attribute)?;
            let Value::Object(operator) = operator else {
                return Err(AppError::Validation(format!(
                    "condition for '{attribute}' must be an operator object"
                )));
            };
            if operator.len() != 1 {
                return Err(AppError::Validation(format!(
                    "condition for '{attribute}' must use exactly one operator"
                )));
            }
            for (key, operand) in operator {
                clauses.push(ConditionClause::new(
                    attribute,
                    ConditionOperator::from_json(key, operand)?,
                ));
            }
        }

        Self::new(clauses)
    }
}

impl TryFrom<Value> for ConditionPredicate {
    type Error = AppError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<ConditionPredicate> for Value {
    fn from(value: ConditionPredicate) -> Self {
        value.to_json()
    }
}

fn scalar_value(value: &Value) -> AppResult<String> {
    match value {
        Value::String(value) => Ok(value.clone()),
        Value::Number(value) => Ok(value.to_string()),
        _ => Err(AppError::Validation(
            "condition values must be strings or numbers".to_owned(),
        )),
    }
}

// Integers compare numerically, everything else lexicographically.
fn compare_values(left: &str, right: &str) -> Ordering {
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => left.cmp(right),
    }
}
