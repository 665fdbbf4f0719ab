//! Content that is readable without any purchase or entitlement.

use crate::{ResourceContext, ResourceHierarchy, ResourceType};

/// Platform-wide free-content settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreeContentPolicy {
    /// Tutorials are readable without an email signup.
    pub email_not_required: bool,
}

/// Request facts the free-content policy looks at.
#[derive(Debug, Clone, Copy)]
pub struct FreeContentContext<'a> {
    /// Parent and sibling lookup for the request.
    pub hierarchy: &'a ResourceHierarchy,
    /// The resource is being viewed as a solution.
    pub is_solution: bool,
    /// A user or subscriber identity is present.
    pub has_viewer_identity: bool,
}

impl FreeContentPolicy {
    /// Returns whether the resource is readable for free.
    #[must_use]
    pub fn is_freely_visible(
        &self,
        resource: &ResourceContext,
        context: FreeContentContext<'_>,
    ) -> bool {
        if resource.resource_type == ResourceType::Solution || context.is_solution {
            return false;
        }

        match resource.resource_type {
            ResourceType::Tip | ResourceType::Talk => true,
            ResourceType::Tutorial => self.email_not_required || context.has_viewer_identity,
            ResourceType::Exercise | ResourceType::Explainer | ResourceType::Lesson => {
                context.hierarchy.position_of(&resource.id) == Some(0)
            }
            _ => false,
        }
    }
}
