//! Relationship descriptions produced by schemas

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::link::{Link, Links};
use crate::object::Object;
use serde_json::Value;

/// Data of a relationship (or of a document's primary data)
///
/// Exactly one of `is_null`, `is_identifier`, `is_resource` and
/// `is_collection` is true. Accessors for the wrong variant fail with
/// [`Error::InvalidVariant`].
#[derive(Debug, Clone)]
pub enum RelationshipData {
    Null,
    Identifier(Identifier),
    Resource(Object),
    Identifiers(Vec<Identifier>),
    Resources(Vec<Object>),
}

impl RelationshipData {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Identifiers(_) | Self::Resources(_))
    }

    /// Number of items; null counts as zero
    pub fn len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::Identifier(_) | Self::Resource(_) => 1,
            Self::Identifiers(items) => items.len(),
            Self::Resources(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Identifier(_) => "identifier",
            Self::Resource(_) => "resource",
            Self::Identifiers(_) => "identifier collection",
            Self::Resources(_) => "resource collection",
        }
    }

    pub fn identifier(&self) -> Result<&Identifier> {
        match self {
            Self::Identifier(identifier) => Ok(identifier),
            other => Err(other.wrong_variant("identifier")),
        }
    }

    pub fn resource(&self) -> Result<&Object> {
        match self {
            Self::Resource(object) => Ok(object),
            other => Err(other.wrong_variant("resource")),
        }
    }

    pub fn identifiers(&self) -> Result<&[Identifier]> {
        match self {
            Self::Identifiers(items) => Ok(items),
            other => Err(other.wrong_variant("identifier collection")),
        }
    }

    pub fn resources(&self) -> Result<&[Object]> {
        match self {
            Self::Resources(items) => Ok(items),
            other => Err(other.wrong_variant("resource collection")),
        }
    }

    fn wrong_variant(&self, expected: &'static str) -> Error {
        Error::InvalidVariant {
            expected,
            found: self.variant_name(),
        }
    }
}

impl From<Object> for RelationshipData {
    fn from(object: Object) -> Self {
        Self::Resource(object)
    }
}

impl From<Option<Object>> for RelationshipData {
    fn from(object: Option<Object>) -> Self {
        object.map_or(Self::Null, Self::Resource)
    }
}

impl From<Vec<Object>> for RelationshipData {
    fn from(objects: Vec<Object>) -> Self {
        Self::Resources(objects)
    }
}

impl From<Identifier> for RelationshipData {
    fn from(identifier: Identifier) -> Self {
        Self::Identifier(identifier)
    }
}

impl From<Vec<Identifier>> for RelationshipData {
    fn from(identifiers: Vec<Identifier>) -> Self {
        Self::Identifiers(identifiers)
    }
}

/// A named relationship as described by a schema
///
/// A relationship without data (see [`Relationship::without_data`]) is
/// rendered with links and meta only; its `data` member is omitted.
#[derive(Debug, Clone, Default)]
pub struct Relationship {
    data: Option<RelationshipData>,
    links: Links,
    meta: Option<Value>,
    self_link: bool,
    related_link: bool,
}

impl Relationship {
    pub fn new(data: impl Into<RelationshipData>) -> Self {
        Self {
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn without_data() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&RelationshipData> {
        self.data.as_ref()
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn with_link(mut self, name: impl Into<String>, link: Link) -> Self {
        self.links.insert(name, link);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Add `links.self` pointing at `{self_sub_url}/relationships/{name}`
    pub fn with_self_link(mut self) -> Self {
        self.self_link = true;
        self
    }

    /// Add `links.related` pointing at `{self_sub_url}/{name}`
    pub fn with_related_link(mut self) -> Self {
        self.related_link = true;
        self
    }

    pub fn shows_self_link(&self) -> bool {
        self.self_link
    }

    pub fn shows_related_link(&self) -> bool {
        self.related_link
    }

    /// Explicit links merged with the generated self/related links
    pub fn resolved_links(&self, name: &str, owner_sub_url: &str) -> Links {
        let mut links = Links::new();
        if self.self_link {
            links.insert(
                Link::SELF,
                Link::prefixed(format!("{}/relationships/{}", owner_sub_url, name)),
            );
        }
        if self.related_link {
            links.insert(
                Link::RELATED,
                Link::prefixed(format!("{}/{}", owner_sub_url, name)),
            );
        }
        for (link_name, link) in self.links.iter() {
            links.insert(link_name, link.clone());
        }
        links
    }
}
