use std::fmt::{Display, Formatter};
use std::str::FromStr;

use lectern_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{ResourceId, SubjectAttributes, UserId};

/// Content resource types known to the access policy.
///
/// Types the policy has no special handling for are preserved verbatim in
/// [`ResourceType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    /// Short standalone tip.
    Tip,
    /// Recorded conference talk.
    Talk,
    /// Free tutorial module.
    Tutorial,
    /// Hands-on exercise.
    Exercise,
    /// Explainer video.
    Explainer,
    /// Lesson inside a module or section.
    Lesson,
    /// Exercise solution.
    Solution,
    /// Section grouping lessons inside a module.
    Section,
    /// Paid workshop module.
    Workshop,
    /// Article post.
    Post,
    /// Any other resource type.
    Other(String),
}

impl ResourceType {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tip => "tip",
            Self::Talk => "talk",
            Self::Tutorial => "tutorial",
            Self::Exercise => "exercise",
            Self::Explainer => "explainer",
            Self::Lesson => "lesson",
            Self::Solution => "solution",
            Self::Section => "section",
            Self::Workshop => "workshop",
            Self::Post => "post",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "tip" => Self::Tip,
            "talk" => Self::Talk,
            "tutorial" => Self::Tutorial,
            "exercise" => Self::Exercise,
            "explainer" => Self::Explainer,
            "lesson" => Self::Lesson,
            "solution" => Self::Solution,
            "section" => Self::Section,
            "workshop" => Self::Workshop,
            "post" => Self::Post,
            _ => Self::Other(value),
        }
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Other(value) => value,
            other => other.as_str().to_owned(),
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Editorial state of a content resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Work in progress, not visible outside the authoring tools.
    #[default]
    Draft,
    /// Awaiting review.
    Review,
    /// Live in the catalog.
    Published,
    /// Removed from the catalog but retained.
    Archived,
    /// Soft-deleted.
    Deleted,
}

impl ResourceState {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Published => "published",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ResourceState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown resource state '{value}'"
            ))),
        }
    }
}

/// Audience visibility of a content resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed and reachable by anyone.
    #[default]
    Public,
    /// Restricted to its author and administrators.
    Private,
    /// Reachable by direct link only.
    Unlisted,
}

impl Visibility {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Unlisted => "unlisted",
        }
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            _ => Err(AppError::Validation(format!(
                "unknown visibility '{value}'"
            ))),
        }
    }
}

/// Editorial fields of a content resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceFields {
    /// Editorial state.
    #[serde(default)]
    pub state: ResourceState,
    /// Audience visibility.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Reference to one child resource in a parent's ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// Child resource id.
    pub resource_id: ResourceId,
}

/// Hydrated content resource handed to the access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContext {
    /// Resource id.
    pub id: ResourceId,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Editorial fields.
    #[serde(default)]
    pub fields: ResourceFields,
    /// Author of the resource.
    #[serde(default)]
    pub created_by_id: Option<UserId>,
    /// Ordered child resources.
    #[serde(default)]
    pub resources: Vec<ResourceRef>,
    /// Products that sell access to this resource.
    #[serde(default)]
    pub resource_products: Vec<String>,
}

impl ResourceContext {
    /// Creates a published, public resource without children.
    #[must_use]
    pub fn new(id: ResourceId, resource_type: ResourceType) -> Self {
        Self {
            id,
            resource_type,
            fields: ResourceFields {
                state: ResourceState::Published,
                visibility: Visibility::Public,
            },
            created_by_id: None,
            resources: Vec::new(),
            resource_products: Vec::new(),
        }
    }

    /// Returns the ordered child ids.
    pub fn child_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.resources.iter().map(|reference| &reference.resource_id)
    }

    /// Returns the attributes conditions are evaluated against.
    #[must_use]
    pub fn subject_attributes(&self) -> SubjectAttributes {
        SubjectAttributes {
            id: Some(self.id.as_str().to_owned()),
            created_by_id: self
                .created_by_id
                .as_ref()
                .map(|value| value.as_str().to_owned()),
            state: Some(self.fields.state.as_str().to_owned()),
            visibility: Some(self.fields.visibility.as_str().to_owned()),
            country: None,
        }
    }
}
