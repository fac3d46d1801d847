//! Include-path and field-set decisions

use crate::params::EncodingParameters;
use crate::schema::SchemaRegistry;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Include paths digested into prefix lookups
#[derive(Debug, Default)]
struct IncludeTree {
    /// Every requested path and each of its segment-boundary prefixes
    paths: HashSet<String>,
    /// Path -> names of the relationships to expand below it ("" is the root)
    children: HashMap<String, BTreeSet<String>>,
}

impl IncludeTree {
    fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = IncludeTree::default();
        for path in paths {
            let mut prefix = String::new();
            for segment in path.as_ref().split('.').map(str::trim).filter(|s| !s.is_empty()) {
                tree.children
                    .entry(prefix.clone())
                    .or_default()
                    .insert(segment.to_string());
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(segment);
                tree.paths.insert(prefix.clone());
            }
        }
        tree
    }

    fn contains(&self, path: &str) -> bool {
        path.is_empty() || self.paths.contains(path)
    }

    fn children(&self, path: &str) -> BTreeSet<String> {
        self.children.get(path).cloned().unwrap_or_default()
    }
}

/// Answers inclusion and field-set questions for one encode call
///
/// Explicit include paths are digested once; when the request has none, the
/// root schema's defaults are digested on first use for each root type.
pub struct ParameterAnalyzer<'a> {
    parameters: &'a EncodingParameters,
    registry: &'a SchemaRegistry,
    explicit: Option<IncludeTree>,
    defaults: RefCell<HashMap<String, IncludeTree>>,
}

impl<'a> ParameterAnalyzer<'a> {
    pub fn new(parameters: &'a EncodingParameters, registry: &'a SchemaRegistry) -> Self {
        let explicit = parameters.include_paths().map(IncludeTree::from_paths);
        Self {
            parameters,
            registry,
            explicit,
            defaults: RefCell::new(HashMap::new()),
        }
    }

    pub fn parameters(&self) -> &EncodingParameters {
        self.parameters
    }

    fn with_tree<R>(&self, root_type: &str, f: impl FnOnce(&IncludeTree) -> R) -> R {
        if let Some(tree) = &self.explicit {
            return f(tree);
        }
        let mut defaults = self.defaults.borrow_mut();
        let tree = defaults.entry(root_type.to_string()).or_insert_with(|| {
            let paths = self.registry.default_include_paths(root_type);
            tracing::trace!("Default include paths for '{}': {:?}", root_type, paths);
            IncludeTree::from_paths(paths)
        });
        f(tree)
    }

    /// True when `path` is requested or lies on the way to a requested path.
    /// The root (empty path) is always included.
    pub fn is_path_included(&self, path: &str, root_type: &str) -> bool {
        self.with_tree(root_type, |tree| tree.contains(path))
    }

    /// Names of the relationships to expand when standing at `path`
    pub fn include_relationships(&self, path: Option<&str>, root_type: &str) -> BTreeSet<String> {
        let path = path.unwrap_or("");
        self.with_tree(root_type, |tree| tree.children(path))
    }

    pub fn field_set(&self, resource_type: &str) -> Option<&'a BTreeSet<String>> {
        self.parameters.field_set(resource_type)
    }

    /// False only when the type's field-set is configured and empty
    pub fn has_some_fields(&self, resource_type: &str) -> bool {
        self.field_set(resource_type)
            .map_or(true, |fields| !fields.is_empty())
    }

    /// Whether `name` survives the field-set filter of `resource_type`
    pub fn is_field_in_field_set(&self, resource_type: &str, name: &str) -> bool {
        self.field_set(resource_type)
            .map_or(true, |fields| fields.contains(name))
    }
}
