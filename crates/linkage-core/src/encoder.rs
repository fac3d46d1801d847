//! Encoder facade

use crate::analyzer::ParameterAnalyzer;
use crate::assembler::DocumentAssembler;
use crate::document::Document;
use crate::error::Result;
use crate::error_object::ErrorObject;
use crate::link::Links;
use crate::params::EncodingParameters;
use crate::parser::Parser;
use crate::relationship::RelationshipData;
use crate::schema::SchemaRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// Prepended to every prefixed link
    pub url_prefix: Option<String>,

    /// Pretty-print output
    pub pretty: bool,

    /// Maximum relationship depth below the primary data
    pub max_depth: usize,

    /// Emitted as `{"jsonapi": {"version": ...}}` when set
    pub jsonapi_version: Option<String>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            url_prefix: None,
            pretty: false,
            max_depth: Parser::DEFAULT_MAX_DEPTH,
            jsonapi_version: None,
        }
    }
}

/// Turns domain objects into JSON:API documents
///
/// ```ignore
/// let encoder = Encoder::new(Arc::new(registry))
///     .with_options(EncoderOptions { pretty: true, ..Default::default() });
/// let params = EncodingParameters::new().with_include_paths(["comments"]);
/// let json = encoder.encode_data(Object::from_arc(author), &params)?;
/// ```
pub struct Encoder {
    registry: Arc<SchemaRegistry>,
    options: EncoderOptions,
    links: Links,
    meta: Option<Value>,
}

impl Encoder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            options: EncoderOptions::default(),
            links: Links::new(),
            meta: None,
        }
    }

    pub fn with_options(mut self, options: EncoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Top-level document links
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    /// Top-level document meta
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_jsonapi_version(mut self, version: impl Into<String>) -> Self {
        self.options.jsonapi_version = Some(version.into());
        self
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Assemble the document for `data` without serializing it
    pub fn document(&self, data: impl Into<RelationshipData>, params: &EncodingParameters) -> Result<Document> {
        self.assemble(data.into(), params, false)
    }

    pub fn encode_data(&self, data: impl Into<RelationshipData>, params: &EncodingParameters) -> Result<String> {
        let document = self.assemble(data.into(), params, false)?;
        self.serialize(&document)
    }

    /// Primary data as resource identifiers only, e.g. for relationship
    /// endpoints
    pub fn encode_identifiers(
        &self,
        data: impl Into<RelationshipData>,
        params: &EncodingParameters,
    ) -> Result<String> {
        let document = self.assemble(data.into(), params, true)?;
        self.serialize(&document)
    }

    pub fn encode_error(&self, error: &ErrorObject) -> Result<String> {
        self.encode_errors(std::slice::from_ref(error))
    }

    pub fn encode_errors(&self, errors: &[ErrorObject]) -> Result<String> {
        let mut document = self.envelope();
        document.set_errors(errors.to_vec());
        self.serialize(&document)
    }

    /// Meta-only document; encoder-level meta is replaced by `meta`
    pub fn encode_meta(&self, meta: Value) -> Result<String> {
        let mut document = self.envelope();
        document.set_meta(meta);
        self.serialize(&document)
    }

    fn envelope(&self) -> Document {
        let mut document = Document::new();
        if let Some(version) = &self.options.jsonapi_version {
            document.set_jsonapi_version(version);
        }
        if let Some(meta) = &self.meta {
            document.set_meta(meta.clone());
        }
        document.set_links(self.links.clone());
        document
    }

    fn assemble(&self, data: RelationshipData, params: &EncodingParameters, identifiers_only: bool) -> Result<Document> {
        let analyzer = ParameterAnalyzer::new(params, &self.registry);
        let parser = Parser::new(&self.registry, &analyzer).with_max_depth(self.options.max_depth);

        let mut document = self.envelope();
        if data.is_collection() {
            document.expect_collection();
        }

        let mut assembler = DocumentAssembler::new(&analyzer, document).identifiers_only(identifiers_only);
        parser.parse_with(&data, &mut assembler)?;
        let document = assembler.into_document();

        tracing::debug!(
            "Assembled {} document with {} included resources",
            data.variant_name(),
            document.included().len()
        );
        Ok(document)
    }

    fn serialize(&self, document: &Document) -> Result<String> {
        let value = document.to_value(self.options.url_prefix.as_deref())?;
        let text = if self.options.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fixtures;
    use crate::link::Link;
    use crate::object::Object;
    use serde_json::json;

    fn encoder() -> Encoder {
        Encoder::new(Arc::new(fixtures::registry()))
    }

    fn encode(encoder: &Encoder, data: impl Into<RelationshipData>, params: &EncodingParameters) -> Value {
        let text = encoder.encode_data(data, params).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_author_with_included_comments() {
        let params = EncodingParameters::new().with_include_paths(["comments"]);
        let author = Object::from_arc(fixtures::author_with_comments());

        assert_eq!(
            encode(&encoder(), author, &params),
            json!({
                "data": {
                    "type": "people",
                    "id": "9",
                    "attributes": {"first_name": "Dan", "last_name": "Gebhardt"},
                    "relationships": {
                        "comments": {"data": [
                            {"type": "comments", "id": "5"},
                            {"type": "comments", "id": "12"}
                        ]}
                    },
                    "links": {"self": "/people/9"}
                },
                "included": [
                    {
                        "type": "comments",
                        "id": "5",
                        "attributes": {"body": "First!"},
                        "relationships": {
                            "author": {
                                "data": {"type": "people", "id": "9"},
                                "links": {"self": "/comments/5/relationships/author"}
                            }
                        }
                    },
                    {
                        "type": "comments",
                        "id": "12",
                        "attributes": {"body": "I like XML better"},
                        "relationships": {
                            "author": {
                                "data": {"type": "people", "id": "9"},
                                "links": {"self": "/comments/12/relationships/author"}
                            }
                        }
                    }
                ]
            })
        );
    }

    #[test]
    fn test_schema_default_include_paths() {
        let options = EncoderOptions {
            url_prefix: Some("http://example.com".to_string()),
            ..Default::default()
        };
        let value = encode(
            &encoder().with_options(options),
            Object::from_arc(fixtures::site()),
            &EncodingParameters::new(),
        );

        assert_eq!(
            value["data"]["relationships"]["owner"],
            json!({"links": {"related": "http://example.com/sites/1/owner"}})
        );
        assert_eq!(
            value["data"]["relationships"]["posts"]["data"],
            json!([{"type": "posts", "id": "1"}])
        );

        let included: Vec<(String, String)> = value["included"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["type"].as_str().unwrap().to_string(), e["id"].as_str().unwrap().to_string()))
            .collect();
        assert_eq!(
            included,
            vec![
                ("posts".to_string(), "1".to_string()),
                ("people".to_string(), "9".to_string()),
            ]
        );
        assert!(value["included"][0].get("links").is_none());
    }

    #[test]
    fn test_encoding_is_repeatable() {
        let encoder = encoder();
        let params = EncodingParameters::new().with_include_paths(["author", "comments.author"]);
        let post = Object::from_arc(fixtures::post());

        let first = encoder.encode_data(post.clone(), &params).unwrap();
        let second = encoder.encode_data(post, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_level_members() {
        let encoder = encoder()
            .with_jsonapi_version("1.0")
            .with_meta(json!({"copyright": "Linkage"}))
            .with_links(Links::new().with(Link::SELF, Link::prefixed("/posts")));
        let text = encoder
            .encode_data(Vec::<Object>::new(), &EncodingParameters::new())
            .unwrap();

        assert_eq!(
            text,
            r#"{"jsonapi":{"version":"1.0"},"meta":{"copyright":"Linkage"},"links":{"self":"/posts"},"data":[]}"#
        );
    }

    #[test]
    fn test_null_primary_data() {
        let value = encode(&encoder(), RelationshipData::Null, &EncodingParameters::new());
        assert_eq!(value, json!({"data": null}));
    }

    #[test]
    fn test_identifiers_document() {
        let posts = vec![Object::from_arc(fixtures::post())];
        let text = encoder()
            .encode_identifiers(posts, &EncodingParameters::new())
            .unwrap();
        assert_eq!(text, r#"{"data":[{"type":"posts","id":"1"}]}"#);
    }

    #[test]
    fn test_error_document() {
        let error = ErrorObject::new().with_status(404).with_title("Not Found");
        let text = encoder().with_jsonapi_version("1.0").encode_error(&error).unwrap();
        assert_eq!(
            text,
            r#"{"jsonapi":{"version":"1.0"},"errors":[{"status":"404","title":"Not Found"}]}"#
        );
    }

    #[test]
    fn test_meta_document() {
        let text = encoder().encode_meta(json!({"count": 3})).unwrap();
        assert_eq!(text, r#"{"meta":{"count":3}}"#);
    }

    #[test]
    fn test_unregistered_type_fails() {
        let result = encoder().encode_data(Object::new("plain string"), &EncodingParameters::new());
        assert!(matches!(result, Err(Error::SchemaNotFound { .. })));
    }

    #[test]
    fn test_pretty_output() {
        let options = EncoderOptions {
            pretty: true,
            ..Default::default()
        };
        let text = encoder()
            .with_options(options)
            .encode_meta(json!({"count": 3}))
            .unwrap();
        assert!(text.contains("\n  \"meta\""));
    }
}
