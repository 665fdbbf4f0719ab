use std::fmt::{Display, Formatter};

use lectern_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Stable identifier of a platform user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(NonEmptyString);

impl UserId {
    /// Creates a validated user identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Stable identifier of a content resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(NonEmptyString);

impl ResourceId {
    /// Creates a validated resource identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceId, UserId};

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(UserId::new(" ").is_err());
        assert!(ResourceId::new("").is_err());
    }

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let resource_id = ResourceId::new("lesson-1").unwrap_or_else(|_| panic!("test"));
        let encoded = serde_json::to_string(&resource_id).unwrap_or_default();
        assert_eq!(encoded, "\"lesson-1\"");
    }
}
