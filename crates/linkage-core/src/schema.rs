//! Schema capability and registry
//!
//! A [`Schema`] describes how one Rust type is exposed as a resource. Domain
//! types don't implement anything themselves: schemas are registered in a
//! [`SchemaRegistry`] keyed by the domain object's runtime type.

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::link::{Link, Links};
use crate::object::Object;
use crate::relationship::Relationship;
use crate::resource::ResourceObject;
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

/// What the encoder expects from the relationships of the object being built
///
/// Schemas may use it to skip loading data for relationships that will not
/// be expanded.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipContext<'a> {
    include: &'a BTreeSet<String>,
    is_primary: bool,
}

impl<'a> RelationshipContext<'a> {
    pub fn new(include: &'a BTreeSet<String>, is_primary: bool) -> Self {
        Self {
            include,
            is_primary,
        }
    }

    /// Whether the named relationship will be expanded at this position
    pub fn is_included(&self, name: &str) -> bool {
        self.include.contains(name)
    }

    pub fn include_relationships(&self) -> &BTreeSet<String> {
        self.include
    }

    /// Whether the object is a member of the primary data
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// Resource adapter for domain type `T`
pub trait Schema<T>: Send + Sync {
    /// JSON:API `type` of every resource produced by this schema
    fn resource_type(&self) -> &str;

    fn id(&self, object: &T) -> String;

    fn attributes(&self, object: &T) -> Map<String, Value>;

    /// Relationships in the order they should be emitted
    fn relationships(&self, _object: &T, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        Vec::new()
    }

    /// Include paths used when the request does not specify any
    fn include_paths(&self) -> Vec<String> {
        Vec::new()
    }

    fn self_sub_url(&self, object: &T) -> String {
        format!("/{}/{}", self.resource_type(), self.id(object))
    }

    fn resource_links(&self, object: &T) -> Links {
        Links::new().with(Link::SELF, Link::prefixed(self.self_sub_url(object)))
    }

    fn resource_meta(&self, _object: &T) -> Option<Value> {
        None
    }

    fn identifier_meta(&self, _object: &T) -> Option<Value> {
        None
    }

    /// Keep the `self` link on resources placed in `included`
    fn show_self_in_included(&self) -> bool {
        false
    }
}

/// Object-safe view over a `Schema<T>` for any `T`
pub(crate) trait ErasedSchema: Send + Sync {
    fn resource_type(&self) -> &str;

    fn include_paths(&self) -> Vec<String>;

    fn create_resource(
        &self,
        object: &Object,
        field_set: Option<&BTreeSet<String>>,
        ctx: &RelationshipContext<'_>,
    ) -> Result<ResourceObject>;
}

struct SchemaAdapter<T, S> {
    schema: S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> ErasedSchema for SchemaAdapter<T, S>
where
    T: Any + Send + Sync,
    S: Schema<T>,
{
    fn resource_type(&self) -> &str {
        self.schema.resource_type()
    }

    fn include_paths(&self) -> Vec<String> {
        self.schema.include_paths()
    }

    fn create_resource(
        &self,
        object: &Object,
        field_set: Option<&BTreeSet<String>>,
        ctx: &RelationshipContext<'_>,
    ) -> Result<ResourceObject> {
        let value = object.downcast_ref::<T>().ok_or_else(|| {
            Error::Internal(format!(
                "schema for {} received {}",
                std::any::type_name::<T>(),
                object.type_name()
            ))
        })?;

        let mut identifier = Identifier::new(self.schema.resource_type(), self.schema.id(value));
        if let Some(meta) = self.schema.identifier_meta(value) {
            identifier = identifier.with_meta(meta);
        }

        let mut attributes = self.schema.attributes(value);
        if let Some(fields) = field_set {
            attributes.retain(|name, _| fields.contains(name));
        }

        Ok(ResourceObject::new(identifier, attributes)
            .with_relationships(self.schema.relationships(value, ctx))
            .with_links(self.schema.resource_links(value))
            .with_meta(self.schema.resource_meta(value))
            .with_self_sub_url(self.schema.self_sub_url(value))
            .with_self_in_included(self.schema.show_self_in_included()))
    }
}

/// Maps domain types to their schemas
///
/// Populate it once at startup and share it read-only (e.g. behind an `Arc`).
#[derive(Default)]
pub struct SchemaRegistry {
    by_type: HashMap<TypeId, Arc<dyn ErasedSchema>>,
    by_resource_type: HashMap<String, Arc<dyn ErasedSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema for domain type `T`, replacing any previous one
    pub fn register<T, S>(&mut self, schema: S) -> &mut Self
    where
        T: Any + Send + Sync,
        S: Schema<T> + 'static,
    {
        let adapter: Arc<dyn ErasedSchema> = Arc::new(SchemaAdapter {
            schema,
            _marker: PhantomData::<fn() -> T>,
        });
        tracing::debug!(
            "Registering schema for {} as '{}'",
            std::any::type_name::<T>(),
            adapter.resource_type()
        );
        self.by_resource_type
            .insert(adapter.resource_type().to_string(), adapter.clone());
        self.by_type.insert(TypeId::of::<T>(), adapter);
        self
    }

    /// Builder style [`SchemaRegistry::register`]
    pub fn with_schema<T, S>(mut self, schema: S) -> Self
    where
        T: Any + Send + Sync,
        S: Schema<T> + 'static,
    {
        self.register::<T, S>(schema);
        self
    }

    pub fn is_registered<T: Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    pub fn has_resource_type(&self, resource_type: &str) -> bool {
        self.by_resource_type.contains_key(resource_type)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub(crate) fn schema_for(&self, object: &Object) -> Result<&dyn ErasedSchema> {
        self.by_type
            .get(&object.value_type_id())
            .map(|schema| schema.as_ref())
            .ok_or_else(|| Error::SchemaNotFound {
                type_name: object.type_name().to_string(),
            })
    }

    /// Resource type name the object will be encoded as
    pub fn resource_type_of(&self, object: &Object) -> Result<&str> {
        Ok(self.schema_for(object)?.resource_type())
    }

    /// Default include paths declared by the schema of `resource_type`;
    /// empty when the type is unknown
    pub fn default_include_paths(&self, resource_type: &str) -> Vec<String> {
        self.by_resource_type
            .get(resource_type)
            .map(|schema| schema.include_paths())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.by_resource_type.keys().collect();
        types.sort();
        f.debug_struct("SchemaRegistry")
            .field("resource_types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Author};
    use serde_json::json;

    #[test]
    fn test_lookup_by_runtime_type() {
        let registry = fixtures::registry();
        let author = fixtures::author_with_comments();

        assert!(registry.is_registered::<Author>());
        assert!(registry.has_resource_type("people"));
        assert_eq!(
            registry.resource_type_of(&Object::from_arc(author)).unwrap(),
            "people"
        );
    }

    #[test]
    fn test_unregistered_type_is_configuration_error() {
        let registry = fixtures::registry();
        let err = registry
            .resource_type_of(&Object::new(String::from("not a resource")))
            .unwrap_err();

        match err {
            Error::SchemaNotFound { type_name } => assert!(type_name.contains("String")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_default_include_paths() {
        let registry = fixtures::registry();
        assert_eq!(registry.default_include_paths("sites"), vec!["posts.author"]);
        assert!(registry.default_include_paths("unknown").is_empty());
    }

    #[test]
    fn test_field_set_filters_attributes() {
        let registry = fixtures::registry();
        let author = Object::from_arc(fixtures::author_with_comments());
        let include = BTreeSet::new();
        let fields: BTreeSet<String> = ["last_name".to_string()].into_iter().collect();

        let resource = registry
            .schema_for(&author)
            .unwrap()
            .create_resource(&author, Some(&fields), &RelationshipContext::new(&include, true))
            .unwrap();

        assert_eq!(resource.key().to_string(), "people:9");
        assert_eq!(
            Value::Object(resource.attributes().clone()),
            json!({"last_name": "Gebhardt"})
        );
        assert_eq!(resource.self_sub_url(), "/people/9");
        assert!(resource.relationship("comments").is_some());
    }
}
