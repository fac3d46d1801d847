//! Blog domain used by unit tests
//!
//! Comments point back at their author through a `Weak`, so an author with
//! comments forms a reference cycle in the encoded graph.

use crate::relationship::{Relationship, RelationshipData};
use crate::schema::{RelationshipContext, Schema, SchemaRegistry};
use crate::Object;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Weak};

pub(crate) struct Author {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub comments: Vec<Arc<Comment>>,
}

pub(crate) struct Comment {
    pub id: u32,
    pub body: String,
    pub author: Weak<Author>,
}

pub(crate) struct Post {
    pub id: u32,
    pub title: String,
    pub author: Option<Arc<Author>>,
    pub comments: Vec<Arc<Comment>>,
}

pub(crate) struct Site {
    pub id: u32,
    pub name: String,
    pub posts: Vec<Arc<Post>>,
}

fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) struct AuthorSchema;

impl Schema<Author> for AuthorSchema {
    fn resource_type(&self) -> &str {
        "people"
    }

    fn id(&self, author: &Author) -> String {
        author.id.to_string()
    }

    fn attributes(&self, author: &Author) -> Map<String, Value> {
        attributes(json!({
            "first_name": author.first_name,
            "last_name": author.last_name,
        }))
    }

    fn relationships(&self, author: &Author, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        let comments: Vec<Object> = author.comments.iter().cloned().map(Object::from_arc).collect();
        vec![("comments".to_string(), Relationship::new(comments))]
    }
}

pub(crate) struct CommentSchema;

impl Schema<Comment> for CommentSchema {
    fn resource_type(&self) -> &str {
        "comments"
    }

    fn id(&self, comment: &Comment) -> String {
        comment.id.to_string()
    }

    fn attributes(&self, comment: &Comment) -> Map<String, Value> {
        attributes(json!({ "body": comment.body }))
    }

    fn relationships(&self, comment: &Comment, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        let author: Option<Object> = comment.author.upgrade().map(Object::from_arc);
        vec![(
            "author".to_string(),
            Relationship::new(RelationshipData::from(author)).with_self_link(),
        )]
    }
}

pub(crate) struct PostSchema;

impl Schema<Post> for PostSchema {
    fn resource_type(&self) -> &str {
        "posts"
    }

    fn id(&self, post: &Post) -> String {
        post.id.to_string()
    }

    fn attributes(&self, post: &Post) -> Map<String, Value> {
        attributes(json!({ "title": post.title }))
    }

    fn relationships(&self, post: &Post, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        let author: Option<Object> = post.author.clone().map(Object::from_arc);
        let comments: Vec<Object> = post.comments.iter().cloned().map(Object::from_arc).collect();
        vec![
            ("author".to_string(), Relationship::new(RelationshipData::from(author))),
            ("comments".to_string(), Relationship::new(comments)),
        ]
    }
}

pub(crate) struct SiteSchema;

impl Schema<Site> for SiteSchema {
    fn resource_type(&self) -> &str {
        "sites"
    }

    fn id(&self, site: &Site) -> String {
        site.id.to_string()
    }

    fn attributes(&self, site: &Site) -> Map<String, Value> {
        attributes(json!({ "name": site.name }))
    }

    fn relationships(&self, site: &Site, _ctx: &RelationshipContext<'_>) -> Vec<(String, Relationship)> {
        let posts: Vec<Object> = site.posts.iter().cloned().map(Object::from_arc).collect();
        vec![
            ("posts".to_string(), Relationship::new(posts)),
            ("owner".to_string(), Relationship::without_data().with_related_link()),
        ]
    }

    fn include_paths(&self) -> Vec<String> {
        vec!["posts.author".to_string()]
    }
}

pub(crate) fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_schema::<Author, _>(AuthorSchema)
        .with_schema::<Comment, _>(CommentSchema)
        .with_schema::<Post, _>(PostSchema)
        .with_schema::<Site, _>(SiteSchema)
}

/// Author 9 with comments 5 and 12, both written by author 9
pub(crate) fn author_with_comments() -> Arc<Author> {
    Arc::new_cyclic(|me: &Weak<Author>| Author {
        id: 9,
        first_name: "Dan".to_string(),
        last_name: "Gebhardt".to_string(),
        comments: vec![
            Arc::new(Comment {
                id: 5,
                body: "First!".to_string(),
                author: me.clone(),
            }),
            Arc::new(Comment {
                id: 12,
                body: "I like XML better".to_string(),
                author: me.clone(),
            }),
        ],
    })
}

/// Post 1 by author 9 carrying both of the author's comments
pub(crate) fn post() -> Arc<Post> {
    let author = author_with_comments();
    Arc::new(Post {
        id: 1,
        title: "JSON API paints my bikeshed!".to_string(),
        comments: author.comments.clone(),
        author: Some(author),
    })
}

/// Site 1 with a single post
pub(crate) fn site() -> Arc<Site> {
    Arc::new(Site {
        id: 1,
        name: "JSON API Samples".to_string(),
        posts: vec![post()],
    })
}
