//! Resource objects built from a domain object and its schema

use crate::identifier::{Identifier, ResourceKey};
use crate::link::Links;
use crate::relationship::Relationship;
use serde_json::{Map, Value};
use std::rc::Rc;

/// A typed, identified node with attributes and relationships
///
/// Built once per visit by the parser and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ResourceObject {
    identifier: Identifier,
    attributes: Map<String, Value>,
    relationships: Vec<(String, Rc<Relationship>)>,
    links: Links,
    meta: Option<Value>,
    self_sub_url: String,
    show_self_in_included: bool,
    identifier_only: bool,
}

impl ResourceObject {
    pub fn new(identifier: Identifier, attributes: Map<String, Value>) -> Self {
        let self_sub_url = format!("/{}/{}", identifier.resource_type(), identifier.id());
        Self {
            identifier,
            attributes,
            relationships: Vec::new(),
            links: Links::new(),
            meta: None,
            self_sub_url,
            show_self_in_included: false,
            identifier_only: false,
        }
    }

    /// Node standing for an identifier given directly as relationship data
    pub fn from_identifier(identifier: Identifier) -> Self {
        Self {
            identifier_only: true,
            ..Self::new(identifier, Map::new())
        }
    }

    pub fn with_relationships(mut self, relationships: Vec<(String, Relationship)>) -> Self {
        self.relationships = relationships
            .into_iter()
            .map(|(name, relationship)| (name, Rc::new(relationship)))
            .collect();
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    pub fn with_meta(mut self, meta: Option<Value>) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_self_sub_url(mut self, sub_url: impl Into<String>) -> Self {
        self.self_sub_url = sub_url.into();
        self
    }

    pub fn with_self_in_included(mut self, show: bool) -> Self {
        self.show_self_in_included = show;
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn resource_type(&self) -> &str {
        self.identifier.resource_type()
    }

    pub fn id(&self) -> &str {
        self.identifier.id()
    }

    pub fn key(&self) -> ResourceKey {
        self.identifier.key()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn relationships(&self) -> &[(String, Rc<Relationship>)] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&Rc<Relationship>> {
        self.relationships
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn self_sub_url(&self) -> &str {
        &self.self_sub_url
    }

    pub fn shows_self_in_included(&self) -> bool {
        self.show_self_in_included
    }

    pub fn is_identifier_only(&self) -> bool {
        self.identifier_only
    }
}
