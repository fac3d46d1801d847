//! Blog domain backing the `encode` command
//!
//! Resources reference each other by id in the input file. Schemas resolve
//! those ids against the loaded [`Blog`], so a person and their comments
//! point at each other and form a cycle.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use linkage_core::{
    Object, Relationship, RelationshipContext, RelationshipData, Schema, SchemaRegistry,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Sample data used when no input file is given
pub const SAMPLE: &str = include_str!("../data/blog.json");

#[derive(Debug, Deserialize)]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub twitter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub comments: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogFile {
    people: Vec<Person>,
    comments: Vec<Comment>,
    posts: Vec<Post>,
    sites: Vec<Site>,
}

/// Table of one resource type, in file order
struct Table<T> {
    rows: Vec<Arc<T>>,
    by_id: HashMap<String, usize>,
}

impl<T> Table<T> {
    fn new(rows: Vec<T>, id: impl Fn(&T) -> &str) -> Self {
        let by_id = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (id(row).to_string(), index))
            .collect();
        Self {
            rows: rows.into_iter().map(Arc::new).collect(),
            by_id,
        }
    }

    fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.by_id.get(id).map(|&index| &self.rows[index])
    }
}

pub struct Blog {
    people: Table<Person>,
    comments: Table<Comment>,
    posts: Table<Post>,
    sites: Table<Site>,
}

impl Blog {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let file: BlogFile = serde_json::from_str(text).context("Failed to parse blog data")?;
        Ok(Self {
            people: Table::new(file.people, |p| p.id.as_str()),
            comments: Table::new(file.comments, |c| c.id.as_str()),
            posts: Table::new(file.posts, |p| p.id.as_str()),
            sites: Table::new(file.sites, |s| s.id.as_str()),
        })
    }

    pub fn sample() -> anyhow::Result<Self> {
        Self::from_json(SAMPLE)
    }

    /// Registry with a schema for every blog resource type
    pub fn registry(self: &Arc<Self>) -> SchemaRegistry {
        SchemaRegistry::new()
            .with_schema::<Person, _>(PersonSchema { blog: self.clone() })
            .with_schema::<Comment, _>(CommentSchema { blog: self.clone() })
            .with_schema::<Post, _>(PostSchema { blog: self.clone() })
            .with_schema::<Site, _>(SiteSchema { blog: self.clone() })
    }

    /// Primary data for `resource_type`, either one resource or all of them
    pub fn select(&self, resource_type: &str, id: Option<&str>) -> anyhow::Result<RelationshipData> {
        let data = match resource_type {
            "people" => select(&self.people, id),
            "comments" => select(&self.comments, id),
            "posts" => select(&self.posts, id),
            "sites" => select(&self.sites, id),
            other => anyhow::bail!(
                "Unknown resource type '{}' (expected people, comments, posts or sites)",
                other
            ),
        };
        data.with_context(|| format!("No {} with id '{}'", resource_type, id.unwrap_or_default()))
    }

    fn person(&self, id: Option<&str>) -> RelationshipData {
        to_one(&self.people, id)
    }

    fn comments_by(&self, author: &str) -> Vec<Object> {
        self.comments
            .rows
            .iter()
            .filter(|c| c.author.as_deref() == Some(author))
            .cloned()
            .map(Object::from_arc)
            .collect()
    }
}

fn select<T: Send + Sync + 'static>(table: &Table<T>, id: Option<&str>) -> Option<RelationshipData> {
    match id {
        Some(id) => table.get(id).cloned().map(|row| Object::from_arc(row).into()),
        None => Some(table.rows.iter().cloned().map(Object::from_arc).collect::<Vec<_>>().into()),
    }
}

fn to_one<T: Send + Sync + 'static>(table: &Table<T>, id: Option<&str>) -> RelationshipData {
    let Some(id) = id else {
        return RelationshipData::Null;
    };
    match table.get(id) {
        Some(row) => Object::from_arc(row.clone()).into(),
        None => {
            tracing::warn!("Dangling reference to id '{}'", id);
            RelationshipData::Null
        }
    }
}

fn to_many<T: Send + Sync + 'static>(table: &Table<T>, ids: &[String]) -> Vec<Object> {
    ids.iter()
        .filter_map(|id| {
            let row = table.get(id);
            if row.is_none() {
                tracing::warn!("Dangling reference to id '{}'", id);
            }
            row.cloned().map(Object::from_arc)
        })
        .collect()
}

fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

struct PersonSchema {
    blog: Arc<Blog>,
}

impl Schema<Person> for PersonSchema {
    fn resource_type(&self) -> &str {
        "people"
    }

    fn id(&self, person: &Person) -> String {
        person.id.clone()
    }

    fn attributes(&self, person: &Person) -> Map<String, Value> {
        let mut map = attributes(json!({
            "first_name": person.first_name,
            "last_name": person.last_name,
        }));
        if let Some(twitter) = &person.twitter {
            map.insert("twitter".to_string(), json!(twitter));
        }
        map
    }

    fn relationships(&self, person: &Person, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        vec![(
            "comments".to_string(),
            Relationship::new(self.blog.comments_by(&person.id)).with_related_link(),
        )]
    }
}

struct CommentSchema {
    blog: Arc<Blog>,
}

impl Schema<Comment> for CommentSchema {
    fn resource_type(&self) -> &str {
        "comments"
    }

    fn id(&self, comment: &Comment) -> String {
        comment.id.clone()
    }

    fn attributes(&self, comment: &Comment) -> Map<String, Value> {
        attributes(json!({ "body": comment.body }))
    }

    fn relationships(&self, comment: &Comment, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        vec![(
            "author".to_string(),
            Relationship::new(self.blog.person(comment.author.as_deref())).with_self_link(),
        )]
    }
}

struct PostSchema {
    blog: Arc<Blog>,
}

impl Schema<Post> for PostSchema {
    fn resource_type(&self) -> &str {
        "posts"
    }

    fn id(&self, post: &Post) -> String {
        post.id.clone()
    }

    fn attributes(&self, post: &Post) -> Map<String, Value> {
        let mut map = attributes(json!({ "title": post.title }));
        if let Some(body) = &post.body {
            map.insert("body".to_string(), json!(body));
        }
        map
    }

    fn relationships(&self, post: &Post, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        vec![
            (
                "author".to_string(),
                Relationship::new(self.blog.person(post.author.as_deref())),
            ),
            (
                "comments".to_string(),
                Relationship::new(to_many(&self.blog.comments, &post.comments)),
            ),
        ]
    }
}

struct SiteSchema {
    blog: Arc<Blog>,
}

impl Schema<Site> for SiteSchema {
    fn resource_type(&self) -> &str {
        "sites"
    }

    fn id(&self, site: &Site) -> String {
        site.id.clone()
    }

    fn attributes(&self, site: &Site) -> Map<String, Value> {
        attributes(json!({ "name": site.name }))
    }

    fn relationships(&self, site: &Site, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        vec![(
            "posts".to_string(),
            Relationship::new(to_many(&self.blog.posts, &site.posts)),
        )]
    }

    fn include_paths(&self) -> Vec<String> {
        vec!["posts.author".to_string()]
    }
}
