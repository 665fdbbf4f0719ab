use std::fmt::{Display, Formatter};
use std::str::FromStr;

use lectern_core::AppError;
use serde::{Deserialize, Serialize};

/// Actions a viewer may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Allows reading a subject.
    Read,
    /// Allows creating a subject.
    Create,
    /// Allows updating a subject.
    Update,
    /// Allows deleting a subject.
    Delete,
    /// Universal action matching every other action.
    Manage,
    /// Allows inviting others into a subject.
    Invite,
}

impl Action {
    /// Returns a stable transport value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
            Self::Invite => "invite",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Manage,
            Action::Invite,
        ];

        ALL
    }

    /// Returns whether a rule granting `self` covers the requested action.
    #[must_use]
    pub fn covers(&self, requested: Action) -> bool {
        *self == Self::Manage || *self == requested
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            "invite" => Ok(Self::Invite),
            _ => Err(AppError::Validation(format!("unknown action '{value}'"))),
        }
    }
}

/// Subject types rules are written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectType {
    /// Wildcard subject matching every subject type.
    #[serde(rename = "all")]
    All,
    /// Content resources (lessons, tips, workshops...).
    Content,
    /// Platform user records.
    User,
    /// Marker subject surfacing a region-blocked purchase.
    RegionRestriction,
    /// Purchase invoices.
    Invoice,
    /// Team seat management.
    Team,
    /// Community Discord access.
    Discord,
}

impl SubjectType {
    /// Returns a stable transport value for this subject type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Content => "Content",
            Self::User => "User",
            Self::RegionRestriction => "RegionRestriction",
            Self::Invoice => "Invoice",
            Self::Team => "Team",
            Self::Discord => "Discord",
        }
    }

    /// Returns whether a rule written for `self` applies to the requested subject type.
    #[must_use]
    pub fn covers(&self, requested: SubjectType) -> bool {
        *self == Self::All || *self == requested
    }

    /// Parses a transport value into a subject type.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl Display for SubjectType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "Content" => Ok(Self::Content),
            "User" => Ok(Self::User),
            "RegionRestriction" => Ok(Self::RegionRestriction),
            "Invoice" => Ok(Self::Invoice),
            "Team" => Ok(Self::Team),
            "Discord" => Ok(Self::Discord),
            _ => Err(AppError::Validation(format!(
                "unknown subject type '{value}'"
            ))),
        }
    }
}
