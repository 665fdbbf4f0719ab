use std::collections::HashMap;

use crate::{ResourceContext, ResourceId, ViewerContext};

/// Flat parent and sibling lookup built once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceHierarchy {
    parent_of: HashMap<ResourceId, ResourceId>,
    ordered_siblings: HashMap<ResourceId, Vec<ResourceId>>,
}

impl ResourceHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the hierarchy from the module and section in a viewer context.
    ///
    /// The section is registered after the module, so a resource listed in
    /// both resolves to the section as its immediate parent.
    #[must_use]
    pub fn from_viewer(context: &ViewerContext) -> Self {
        let mut hierarchy = Self::new();
        for container in [context.module.as_ref(), context.section.as_ref()]
            .into_iter()
            .flatten()
        {
            hierarchy.insert_container(container);
        }

        hierarchy
    }

    /// Registers a container and its ordered children.
    pub fn insert_container(&mut self, container: &ResourceContext) {
        let children: Vec<ResourceId> = container.child_ids().cloned().collect();
        for child in &children {
            self.parent_of.insert(child.clone(), container.id.clone());
        }
        self.ordered_siblings.insert(container.id.clone(), children);
    }

    /// Returns the immediate parent of a resource.
    #[must_use]
    pub fn parent_of(&self, resource_id: &ResourceId) -> Option<&ResourceId> {
        self.parent_of.get(resource_id)
    }

    /// Returns the ordered children of a container.
    #[must_use]
    pub fn children_of(&self, container_id: &ResourceId) -> &[ResourceId] {
        self.ordered_siblings
            .get(container_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the position of a resource among its siblings.
    #[must_use]
    pub fn position_of(&self, resource_id: &ResourceId) -> Option<usize> {
        let parent = self.parent_of(resource_id)?;
        self.children_of(parent)
            .iter()
            .position(|sibling| sibling == resource_id)
    }
}
