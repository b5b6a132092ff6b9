use std::collections::HashMap;

use contact_types::MemberRef;

/// Boundary to whatever loads solids for assembly members.
///
/// `None` is an expected outcome (geometry not uploaded, failed to load),
/// not an error.
pub trait ShapeResolver {
    type Shape;

    fn resolve(&self, project: &str, member: &MemberRef) -> Option<Self::Shape>;
}

/// In-memory resolver keyed by project and member.
#[derive(Debug, Clone)]
pub struct ShapeLibrary<S> {
    shapes: HashMap<(String, MemberRef), S>,
}

impl<S> ShapeLibrary<S> {
    pub fn new() -> Self {
        Self {
            shapes: HashMap::new(),
        }
    }

    /// Register a shape, returning the one it replaces.
    pub fn insert(&mut self, project: &str, member: MemberRef, shape: S) -> Option<S> {
        self.shapes.insert((project.to_string(), member), shape)
    }

    pub fn with(mut self, project: &str, member: MemberRef, shape: S) -> Self {
        self.insert(project, member, shape);
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl<S> Default for ShapeLibrary<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> ShapeResolver for ShapeLibrary<S> {
    type Shape = S;

    fn resolve(&self, project: &str, member: &MemberRef) -> Option<S> {
        self.shapes
            .get(&(project.to_string(), member.clone()))
            .cloned()
    }
}
