//! Output document structure

use crate::error::Result;
use crate::error_object::ErrorObject;
use crate::identifier::{Identifier, ResourceKey};
use crate::link::{Link, Links};
use crate::relationship::Relationship;
use crate::resource::ResourceObject;
use serde_json::{json, Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

/// The `data` member of a relationship
#[derive(Debug, Clone, PartialEq)]
pub enum Linkage {
    Null,
    One(Identifier),
    Many(Vec<Identifier>),
}

impl Linkage {
    fn to_value(&self) -> Value {
        match self {
            Linkage::Null => Value::Null,
            Linkage::One(identifier) => identifier_value(identifier),
            Linkage::Many(identifiers) => {
                Value::Array(identifiers.iter().map(identifier_value).collect())
            }
        }
    }
}

fn identifier_value(identifier: &Identifier) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), json!(identifier.resource_type()));
    map.insert("id".to_string(), json!(identifier.id()));
    if let Some(meta) = identifier.meta() {
        map.insert("meta".to_string(), meta.clone());
    }
    Value::Object(map)
}

/// A relationship as rendered inside a resource entry
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEntry {
    name: String,
    data: Option<Linkage>,
    expects_data: bool,
    links: Links,
    meta: Option<Value>,
}

impl RelationshipEntry {
    pub(crate) fn from_relationship(owner: &ResourceObject, name: &str, relationship: &Relationship) -> Self {
        Self {
            name: name.to_string(),
            data: None,
            expects_data: relationship.has_data(),
            links: relationship.resolved_links(name, owner.self_sub_url()),
            meta: relationship.meta().cloned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Option<&Linkage> {
        self.data.as_ref()
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub(crate) fn set_null(&mut self) {
        self.data = Some(Linkage::Null);
    }

    pub(crate) fn set_empty(&mut self) {
        self.data = Some(Linkage::Many(Vec::new()));
    }

    /// Record linkage to `identifier`; collections accumulate in order
    pub(crate) fn link_to(&mut self, identifier: Identifier, is_collection: bool) {
        if !is_collection {
            self.data = Some(Linkage::One(identifier));
            return;
        }
        match &mut self.data {
            Some(Linkage::Many(items)) => items.push(identifier),
            _ => self.data = Some(Linkage::Many(vec![identifier])),
        }
    }

    /// Data relationships are only rendered once linkage was recorded;
    /// data-less ones need links or meta
    fn is_renderable(&self) -> bool {
        if self.expects_data {
            self.data.is_some()
        } else {
            !self.links.is_empty() || self.meta.is_some()
        }
    }

    fn to_value(&self, prefix: Option<&str>) -> Value {
        let mut map = Map::new();
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.to_value());
        }
        if let Some(links) = self.links.to_value(prefix) {
            map.insert("links".to_string(), links);
        }
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), meta.clone());
        }
        Value::Object(map)
    }
}

/// A resource as rendered in `data` or `included`
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    identifier: Identifier,
    attributes: Option<Map<String, Value>>,
    relationships: Vec<RelationshipEntry>,
    links: Links,
    meta: Option<Value>,
    identifier_only: bool,
}

impl ResourceEntry {
    /// Entry rendered as a bare resource identifier
    pub fn from_identifier(identifier: Identifier) -> Self {
        Self {
            identifier,
            attributes: None,
            relationships: Vec::new(),
            links: Links::new(),
            meta: None,
            identifier_only: true,
        }
    }

    /// Full entry; relationships outside `field_set` get no slot
    pub(crate) fn from_resource(
        resource: &ResourceObject,
        field_set: Option<&BTreeSet<String>>,
        in_included: bool,
    ) -> Self {
        let relationships = resource
            .relationships()
            .iter()
            .filter(|(name, _)| field_set.map_or(true, |fields| fields.contains(name)))
            .map(|(name, relationship)| RelationshipEntry::from_relationship(resource, name, relationship))
            .collect();

        let mut links = resource.links().clone();
        if in_included && !resource.shows_self_in_included() {
            links.remove(Link::SELF);
        }

        Self {
            identifier: Identifier::new(resource.resource_type(), resource.id()),
            attributes: Some(resource.attributes().clone()),
            relationships,
            links,
            meta: resource.meta().cloned(),
            identifier_only: false,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn key(&self) -> ResourceKey {
        self.identifier.key()
    }

    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.attributes.as_ref()
    }

    pub fn relationships(&self) -> &[RelationshipEntry] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipEntry> {
        self.relationships.iter().find(|r| r.name == name)
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn is_identifier_only(&self) -> bool {
        self.identifier_only
    }

    /// Slot for `name`, created from `relationship` when missing
    pub(crate) fn relationship_entry(
        &mut self,
        owner: &ResourceObject,
        name: &str,
        relationship: &Relationship,
    ) -> &mut RelationshipEntry {
        let pos = match self.relationships.iter().position(|r| r.name == name) {
            Some(pos) => pos,
            None => {
                self.relationships
                    .push(RelationshipEntry::from_relationship(owner, name, relationship));
                self.relationships.len() - 1
            }
        };
        &mut self.relationships[pos]
    }

    /// Drop attributes and relationships, keeping type, id, links and meta
    pub(crate) fn suppress_fields(&mut self) {
        self.attributes = None;
        self.relationships.clear();
    }

    fn to_value(&self, prefix: Option<&str>) -> Value {
        if self.identifier_only {
            return identifier_value(&self.identifier);
        }

        let mut map = Map::new();
        map.insert("type".to_string(), json!(self.identifier.resource_type()));
        map.insert("id".to_string(), json!(self.identifier.id()));
        if let Some(attributes) = &self.attributes {
            map.insert("attributes".to_string(), Value::Object(attributes.clone()));
        }
        let relationships: Map<String, Value> = self
            .relationships
            .iter()
            .filter(|r| r.is_renderable())
            .map(|r| (r.name.clone(), r.to_value(prefix)))
            .collect();
        if !relationships.is_empty() {
            map.insert("relationships".to_string(), Value::Object(relationships));
        }
        if let Some(links) = self.links.to_value(prefix) {
            map.insert("links".to_string(), links);
        }
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), meta.clone());
        }
        Value::Object(map)
    }
}

/// Primary data of a document
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Null,
    Single(ResourceEntry),
    Collection(Vec<ResourceEntry>),
}

impl PrimaryData {
    fn to_value(&self, prefix: Option<&str>) -> Value {
        match self {
            PrimaryData::Null => Value::Null,
            PrimaryData::Single(entry) => entry.to_value(prefix),
            PrimaryData::Collection(entries) => {
                Value::Array(entries.iter().map(|e| e.to_value(prefix)).collect())
            }
        }
    }
}

/// Top-level document
///
/// `included` never holds two entries with the same `(type, id)` and never
/// holds a resource that is part of the primary data.
#[derive(Debug, Clone, Default)]
pub struct Document {
    data: Option<PrimaryData>,
    included: Vec<ResourceEntry>,
    included_index: HashMap<ResourceKey, usize>,
    completed: HashSet<ResourceKey>,
    primary_keys: HashSet<ResourceKey>,
    errors: Option<Vec<ErrorObject>>,
    links: Links,
    meta: Option<Value>,
    jsonapi: Option<Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary data will be rendered as an array, even with one item
    pub fn expect_collection(&mut self) {
        self.data = Some(PrimaryData::Collection(Vec::new()));
    }

    pub fn set_null_data(&mut self) {
        self.data = Some(PrimaryData::Null);
    }

    pub fn set_empty_data(&mut self) {
        self.data = Some(PrimaryData::Collection(Vec::new()));
    }

    /// Append a primary resource and return its index
    pub fn add_to_data(&mut self, entry: ResourceEntry) -> usize {
        let key = entry.key();
        self.remove_from_included(&key);
        self.primary_keys.insert(key);

        match &mut self.data {
            Some(PrimaryData::Collection(entries)) => {
                entries.push(entry);
                entries.len() - 1
            }
            _ => {
                self.data = Some(PrimaryData::Single(entry));
                0
            }
        }
    }

    pub(crate) fn data_entry_mut(&mut self, index: usize) -> Option<&mut ResourceEntry> {
        match &mut self.data {
            Some(PrimaryData::Single(entry)) if index == 0 => Some(entry),
            Some(PrimaryData::Collection(entries)) => entries.get_mut(index),
            _ => None,
        }
    }

    /// Add a side-loaded resource; returns false for primary or already
    /// included resources
    pub fn add_to_included(&mut self, entry: ResourceEntry) -> bool {
        let key = entry.key();
        if self.primary_keys.contains(&key) || self.included_index.contains_key(&key) {
            return false;
        }
        self.included_index.insert(key, self.included.len());
        self.included.push(entry);
        true
    }

    fn remove_from_included(&mut self, key: &ResourceKey) {
        if let Some(pos) = self.included_index.remove(key) {
            tracing::trace!("Moving {} from included to primary data", key);
            self.included.remove(pos);
            for index in self.included_index.values_mut() {
                if *index > pos {
                    *index -= 1;
                }
            }
        }
    }

    /// Included entry that still accepts linkage
    pub(crate) fn open_included_mut(&mut self, key: &ResourceKey) -> Option<&mut ResourceEntry> {
        if self.completed.contains(key) {
            return None;
        }
        let pos = *self.included_index.get(key)?;
        self.included.get_mut(pos)
    }

    /// Close an included entry; later occurrences of the resource no longer
    /// add linkage to it
    pub(crate) fn set_resource_completed(&mut self, key: &ResourceKey, keep_fields: bool) {
        if self.completed.contains(key) {
            return;
        }
        let Some(&pos) = self.included_index.get(key) else {
            return;
        };
        self.completed.insert(key.clone());
        if !keep_fields {
            if let Some(entry) = self.included.get_mut(pos) {
                entry.suppress_fields();
            }
        }
    }

    pub fn set_errors(&mut self, errors: Vec<ErrorObject>) {
        self.errors = Some(errors);
    }

    pub fn set_links(&mut self, links: Links) {
        self.links = links;
    }

    pub fn set_meta(&mut self, meta: Value) {
        self.meta = Some(meta);
    }

    pub fn set_jsonapi_version(&mut self, version: &str) {
        self.jsonapi = Some(json!({ "version": version }));
    }

    pub fn data(&self) -> Option<&PrimaryData> {
        self.data.as_ref()
    }

    pub fn included(&self) -> &[ResourceEntry] {
        &self.included
    }

    pub fn is_included(&self, key: &ResourceKey) -> bool {
        self.included_index.contains_key(key)
    }

    pub fn errors(&self) -> Option<&[ErrorObject]> {
        self.errors.as_deref()
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// Wire representation with links resolved against `url_prefix`
    pub fn to_value(&self, url_prefix: Option<&str>) -> Result<Value> {
        let mut map = Map::new();
        if let Some(jsonapi) = &self.jsonapi {
            map.insert("jsonapi".to_string(), jsonapi.clone());
        }
        if let Some(meta) = &self.meta {
            map.insert("meta".to_string(), meta.clone());
        }
        if let Some(links) = self.links.to_value(url_prefix) {
            map.insert("links".to_string(), links);
        }
        if let Some(data) = &self.data {
            map.insert("data".to_string(), data.to_value(url_prefix));
        }
        if let Some(errors) = &self.errors {
            map.insert("errors".to_string(), serde_json::to_value(errors)?);
        }
        if !self.included.is_empty() {
            let included = self
                .included
                .iter()
                .map(|entry| entry.to_value(url_prefix))
                .collect();
            map.insert("included".to_string(), Value::Array(included));
        }
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(resource_type: &str, id: &str) -> ResourceEntry {
        let resource = ResourceObject::new(Identifier::new(resource_type, id), Map::new());
        ResourceEntry::from_resource(&resource, None, true)
    }

    #[test]
    fn test_included_is_deduplicated() {
        let mut document = Document::new();
        assert!(document.add_to_included(entry("comments", "5")));
        assert!(!document.add_to_included(entry("comments", "5")));
        assert!(document.add_to_included(entry("comments", "12")));
        assert_eq!(document.included().len(), 2);
    }

    #[test]
    fn test_primary_resources_never_included() {
        let mut document = Document::new();
        document.expect_collection();
        document.add_to_included(entry("people", "2"));
        document.add_to_included(entry("people", "3"));

        document.add_to_data(entry("people", "1"));
        document.add_to_data(entry("people", "2"));
        assert!(!document.add_to_included(entry("people", "1")));

        let keys: Vec<String> = document.included().iter().map(|e| e.key().to_string()).collect();
        assert_eq!(keys, vec!["people:3"]);
        assert!(document.open_included_mut(&ResourceKey::new("people", "3")).is_some());
        assert!(!document.is_included(&ResourceKey::new("people", "2")));
    }

    #[test]
    fn test_completed_entries_are_closed() {
        let mut document = Document::new();
        document.add_to_included(entry("comments", "5"));
        let key = ResourceKey::new("comments", "5");

        document.set_resource_completed(&key, false);
        assert!(document.open_included_mut(&key).is_none());
        assert!(document.included()[0].attributes().is_none());
    }

    #[test]
    fn test_single_and_null_data() {
        let mut document = Document::new();
        document.set_null_data();
        assert_eq!(document.to_value(None).unwrap(), json!({"data": null}));

        document.add_to_data(entry("people", "1"));
        assert_eq!(
            document.to_value(None).unwrap(),
            json!({"data": {"type": "people", "id": "1", "attributes": {}}})
        );
    }

    #[test]
    fn test_envelope_order() {
        let mut document = Document::new();
        document.set_jsonapi_version("1.0");
        document.set_meta(json!({"total": 1}));
        document.set_links(Links::new().with(Link::SELF, Link::prefixed("/people")));
        document.set_empty_data();

        let text = serde_json::to_string(&document.to_value(Some("http://example.com")).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"jsonapi":{"version":"1.0"},"meta":{"total":1},"links":{"self":"http://example.com/people"},"data":[]}"#
        );
    }

    #[test]
    fn test_linkage_accumulates_for_collections() {
        let owner = ResourceObject::new(Identifier::new("posts", "1"), Map::new());
        let relationship = Relationship::new(Vec::<crate::Object>::new());
        let mut rel = RelationshipEntry::from_relationship(&owner, "comments", &relationship);
        assert!(!rel.is_renderable());

        rel.link_to(Identifier::new("comments", "5"), true);
        rel.link_to(Identifier::new("comments", "12"), true);
        assert_eq!(
            rel.to_value(None),
            json!({"data": [{"type": "comments", "id": "5"}, {"type": "comments", "id": "12"}]})
        );
    }
}
