//! Traversal positions and the frame stack

use crate::identifier::ResourceKey;
use crate::relationship::Relationship;
use crate::resource::ResourceObject;
use std::rc::Rc;

/// Where a node sits relative to the primary data
///
/// Level 0 is the document root, primary data items are at level 1 with an
/// empty path, and each relationship step adds one level and one path
/// segment (`comments`, `comments.author`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    level: usize,
    path: String,
    parent_type: Option<String>,
    parent_relationship: Option<String>,
}

impl Position {
    pub fn root() -> Self {
        Self::default()
    }

    /// Position of a primary data item
    pub fn primary() -> Self {
        Self {
            level: 1,
            ..Self::default()
        }
    }

    /// Position reached by following `relationship` from a resource of
    /// `parent_type` standing at this position
    pub fn child(&self, parent_type: &str, relationship: &str) -> Self {
        let path = if self.path.is_empty() {
            relationship.to_string()
        } else {
            format!("{}.{}", self.path, relationship)
        };
        Self {
            level: self.level + 1,
            path,
            parent_type: Some(parent_type.to_string()),
            parent_relationship: Some(relationship.to_string()),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent_type(&self) -> Option<&str> {
        self.parent_type.as_deref()
    }

    pub fn parent_relationship(&self) -> Option<&str> {
        self.parent_relationship.as_deref()
    }
}

/// A node currently being visited
#[derive(Debug, Clone)]
pub struct Frame {
    position: Position,
    resource: Option<Rc<ResourceObject>>,
    relationship: Option<Rc<Relationship>>,
    is_circular: bool,
}

impl Frame {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            resource: None,
            relationship: None,
            is_circular: false,
        }
    }

    pub fn with_resource(mut self, resource: Rc<ResourceObject>) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_relationship(mut self, relationship: Rc<Relationship>) -> Self {
        self.relationship = Some(relationship);
        self
    }

    pub fn circular(mut self, is_circular: bool) -> Self {
        self.is_circular = is_circular;
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn level(&self) -> usize {
        self.position.level
    }

    pub fn path(&self) -> &str {
        &self.position.path
    }

    /// Resource of the frame; `None` for null data and empty collections
    pub fn resource(&self) -> Option<&Rc<ResourceObject>> {
        self.resource.as_ref()
    }

    /// Relationship that led to this frame; `None` for primary data
    pub fn relationship(&self) -> Option<&Rc<Relationship>> {
        self.relationship.as_ref()
    }

    /// Name of the relationship that led to this frame
    pub fn relationship_name(&self) -> Option<&str> {
        self.position.parent_relationship()
    }

    /// The resource already appears in an ancestor frame
    pub fn is_circular(&self) -> bool {
        self.is_circular
    }
}

/// Frames from the document root down to the node being visited
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// A stack holding only the root frame
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(Position::root())],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the top frame; the root frame is never popped
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Frame being visited
    pub fn current(&self) -> &Frame {
        // the root frame is always present
        &self.frames[self.frames.len() - 1]
    }

    /// Parent of the frame being visited
    pub fn parent(&self) -> Option<&Frame> {
        let len = self.frames.len();
        if len >= 2 {
            self.frames.get(len - 2)
        } else {
            None
        }
    }

    /// Number of frames including the root
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.len() <= 1
    }

    /// Resource type of the primary data item the current path starts from
    pub fn root_type(&self) -> Option<&str> {
        self.frames
            .get(1)
            .and_then(|frame| frame.resource())
            .map(|resource| resource.resource_type())
    }

    /// Whether `key` is already on the path from the root to the current frame
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.frames.iter().any(|frame| {
            frame
                .resource()
                .map_or(false, |resource| resource.identifier().key() == *key)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
