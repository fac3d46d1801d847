//! Links attached to documents, resources and relationships

use serde_json::{json, Map, Value};

/// A single link
///
/// Prefixed links are relative to the encoder's `url_prefix`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    href: String,
    is_prefixed: bool,
    meta: Option<Value>,
}

impl Link {
    pub const SELF: &'static str = "self";
    pub const RELATED: &'static str = "related";
    pub const ABOUT: &'static str = "about";
    pub const FIRST: &'static str = "first";
    pub const LAST: &'static str = "last";
    pub const PREV: &'static str = "prev";
    pub const NEXT: &'static str = "next";

    /// Link relative to the configured URL prefix
    pub fn prefixed(sub_url: impl Into<String>) -> Self {
        Self {
            href: sub_url.into(),
            is_prefixed: true,
            meta: None,
        }
    }

    /// Link used as is
    pub fn absolute(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            is_prefixed: false,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn is_prefixed(&self) -> bool {
        self.is_prefixed
    }

    /// Full URL after prefix concatenation
    pub fn url(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) if self.is_prefixed => format!("{}{}", prefix, self.href),
            _ => self.href.clone(),
        }
    }

    /// Wire representation: a string, or `{href, meta}` when meta is present
    pub fn to_value(&self, prefix: Option<&str>) -> Value {
        match &self.meta {
            Some(meta) => json!({ "href": self.url(prefix), "meta": meta }),
            None => Value::String(self.url(prefix)),
        }
    }
}

/// Ordered set of named links
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Links(Vec<(String, Link)>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with(mut self, name: impl Into<String>, link: Link) -> Self {
        self.insert(name, link);
        self
    }

    /// Insert or replace a link, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, link: Link) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = link,
            None => self.0.push((name, link)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Link> {
        let pos = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Link> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, l)| l)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.0.iter().map(|(n, l)| (n.as_str(), l))
    }

    /// Wire representation, `None` when there are no links
    pub fn to_value(&self, prefix: Option<&str>) -> Option<Value> {
        if self.0.is_empty() {
            return None;
        }
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, link)| (name.clone(), link.to_value(prefix)))
            .collect();
        Some(Value::Object(map))
    }
}

impl FromIterator<(String, Link)> for Links {
    fn from_iter<I: IntoIterator<Item = (String, Link)>>(iter: I) -> Self {
        let mut links = Links::new();
        for (name, link) in iter {
            links.insert(name, link);
        }
        links
    }
}
