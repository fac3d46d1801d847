//! Encoding parameters (include paths and sparse field-sets)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Already parsed `include` and `fields[type]` request parameters
///
/// `include_paths: None` means "use each root schema's defaults". A type
/// missing from `field_sets` is not filtered; an empty set means no fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include_paths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_sets: Option<BTreeMap<String, BTreeSet<String>>>,
}

impl EncodingParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request explicit include paths (dot separated relationship chains)
    pub fn with_include_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the fields emitted for `resource_type`
    pub fn with_field_set<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_sets
            .get_or_insert_with(BTreeMap::new)
            .insert(resource_type.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn include_paths(&self) -> Option<&[String]> {
        self.include_paths.as_deref()
    }

    pub fn field_sets(&self) -> Option<&BTreeMap<String, BTreeSet<String>>> {
        self.field_sets.as_ref()
    }

    /// Field-set for a type, `None` when the type is not filtered
    pub fn field_set(&self, resource_type: &str) -> Option<&BTreeSet<String>> {
        self.field_sets.as_ref()?.get(resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let params = EncodingParameters::new()
            .with_include_paths(["posts.author", "comments"])
            .with_field_set("people", ["first_name"])
            .with_field_set("comments", Vec::<String>::new());

        assert_eq!(
            params.include_paths(),
            Some(&["posts.author".to_string(), "comments".to_string()][..])
        );
        assert!(params.field_set("people").unwrap().contains("first_name"));
        assert!(params.field_set("comments").unwrap().is_empty());
        assert!(params.field_set("posts").is_none());
    }

    #[test]
    fn test_defaults_are_unfiltered() {
        let params = EncodingParameters::default();
        assert!(params.include_paths().is_none());
        assert!(params.field_sets().is_none());
        assert!(params.field_set("people").is_none());
    }

    #[test]
    fn test_deserialize() {
        let params: EncodingParameters = serde_json::from_str(
            r#"{"include_paths": ["posts"], "field_sets": {"posts": ["title"]}}"#,
        )
        .unwrap();
        assert_eq!(params.include_paths(), Some(&["posts".to_string()][..]));
        assert!(params.field_set("posts").unwrap().contains("title"));
    }
}
