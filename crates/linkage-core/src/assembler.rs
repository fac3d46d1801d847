//! Builds a [`Document`] from parser events

use crate::analyzer::ParameterAnalyzer;
use crate::document::{Document, ResourceEntry};
use crate::error::{Error, Result};
use crate::parser::{EventKind, ParserHandler};
use crate::stack::{Frame, Stack};

/// Parser handler that places resources into `data` and `included` and
/// records relationship linkage
///
/// Events at level 1 describe primary data. Deeper events describe a
/// relationship of the parent frame's resource.
pub struct DocumentAssembler<'a> {
    analyzer: &'a ParameterAnalyzer<'a>,
    document: Document,
    identifiers_only: bool,
    current_data: Option<usize>,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(analyzer: &'a ParameterAnalyzer<'a>, document: Document) -> Self {
        Self {
            analyzer,
            document,
            identifiers_only: false,
            current_data: None,
        }
    }

    /// Render primary data as bare identifiers
    pub fn identifiers_only(mut self, identifiers_only: bool) -> Self {
        self.identifiers_only = identifiers_only;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn add_to_data(&mut self, kind: EventKind, current: &Frame) {
        match kind {
            EventKind::NullResourceStarted => {
                self.document.set_null_data();
                self.current_data = None;
            }
            EventKind::EmptyCollectionStarted => {
                self.document.set_empty_data();
                self.current_data = None;
            }
            EventKind::ResourceStarted => {
                let Some(resource) = current.resource() else {
                    return;
                };
                let entry = if self.identifiers_only || resource.is_identifier_only() {
                    ResourceEntry::from_identifier(resource.identifier().clone())
                } else {
                    let field_set = self.analyzer.field_set(resource.resource_type());
                    ResourceEntry::from_resource(resource, field_set, false)
                };
                self.current_data = Some(self.document.add_to_data(entry));
            }
            EventKind::ResourceCompleted => {}
        }
    }

    fn add_relationship(&mut self, kind: EventKind, stack: &Stack) -> Result<()> {
        let current = stack.current();
        let nested = current.level() > 2;
        let parent = stack
            .parent()
            .ok_or_else(|| Error::Internal("relationship frame without a parent".to_string()))?;
        let owner = parent
            .resource()
            .ok_or_else(|| Error::Internal(format!("no owner resource for path '{}'", current.path())))?;
        let (Some(name), Some(relationship)) = (current.relationship_name(), current.relationship()) else {
            return Err(Error::Internal(format!(
                "frame at path '{}' has no relationship",
                current.path()
            )));
        };
        let root_type = stack.root_type().unwrap_or_default();

        if kind == EventKind::ResourceStarted {
            if let Some(resource) = current.resource() {
                let parent_included = !nested || self.analyzer.is_path_included(parent.path(), root_type);
                if !resource.is_identifier_only()
                    && parent_included
                    && self.analyzer.is_path_included(current.path(), root_type)
                {
                    let field_set = self.analyzer.field_set(resource.resource_type());
                    if self
                        .document
                        .add_to_included(ResourceEntry::from_resource(resource, field_set, true))
                    {
                        tracing::trace!("Included {} at '{}'", resource.key(), current.path());
                    }
                }
            }
        }

        if !self.analyzer.is_field_in_field_set(owner.resource_type(), name) {
            return Ok(());
        }

        let target = if nested {
            self.document.open_included_mut(&owner.key())
        } else {
            self.current_data
                .and_then(|index| self.document.data_entry_mut(index))
        };
        let Some(target) = target else {
            return Ok(());
        };
        if target.is_identifier_only() {
            return Ok(());
        }

        let entry = target.relationship_entry(owner, name, relationship);
        match kind {
            EventKind::NullResourceStarted => entry.set_null(),
            EventKind::EmptyCollectionStarted => entry.set_empty(),
            EventKind::ResourceStarted => {
                if let Some(resource) = current.resource() {
                    let is_collection = relationship.data().map_or(false, |data| data.is_collection());
                    entry.link_to(resource.identifier().clone(), is_collection);
                }
            }
            EventKind::ResourceCompleted => {}
        }
        Ok(())
    }

    fn complete(&mut self, current: &Frame) {
        let Some(resource) = current.resource() else {
            return;
        };
        if current.level() < 2 || resource.is_identifier_only() {
            return;
        }
        let keep_fields = self.analyzer.has_some_fields(resource.resource_type());
        self.document.set_resource_completed(&resource.key(), keep_fields);
    }
}

impl ParserHandler for DocumentAssembler<'_> {
    fn handle(&mut self, kind: EventKind, stack: &Stack) -> Result<()> {
        let current = stack.current();
        if kind == EventKind::ResourceCompleted {
            self.complete(current);
            return Ok(());
        }

        match current.level() {
            0 => Err(Error::Internal("event emitted for the document root".to_string())),
            1 => {
                self.add_to_data(kind, current);
                Ok(())
            }
            _ => self.add_relationship(kind, stack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Linkage, PrimaryData};
    use crate::fixtures;
    use crate::identifier::{Identifier, ResourceKey};
    use crate::object::Object;
    use crate::params::EncodingParameters;
    use crate::parser::Parser;
    use crate::relationship::RelationshipData;

    fn assemble(data: RelationshipData, params: &EncodingParameters) -> Document {
        let registry = fixtures::registry();
        let analyzer = ParameterAnalyzer::new(params, &registry);
        let parser = Parser::new(&registry, &analyzer);
        let mut document = Document::new();
        if data.is_collection() {
            document.expect_collection();
        }
        let mut assembler = DocumentAssembler::new(&analyzer, document);
        parser.parse_with(&data, &mut assembler).unwrap();
        assembler.into_document()
    }

    fn included_keys(document: &Document) -> Vec<String> {
        document.included().iter().map(|e| e.key().to_string()).collect()
    }

    #[test]
    fn test_cycle_links_back_to_primary() {
        let params = EncodingParameters::new().with_include_paths(["comments"]);
        let document = assemble(
            RelationshipData::from(Object::from_arc(fixtures::author_with_comments())),
            &params,
        );

        let Some(PrimaryData::Single(author)) = document.data() else {
            panic!("expected a single primary resource");
        };
        assert_eq!(author.key(), ResourceKey::new("people", "9"));
        assert_eq!(
            author.relationship("comments").and_then(|r| r.data()),
            Some(&Linkage::Many(vec![
                Identifier::new("comments", "5"),
                Identifier::new("comments", "12"),
            ]))
        );

        assert_eq!(included_keys(&document), vec!["comments:5", "comments:12"]);
        for comment in document.included() {
            assert_eq!(
                comment.relationship("author").and_then(|r| r.data()),
                Some(&Linkage::One(Identifier::new("people", "9")))
            );
        }
    }

    #[test]
    fn test_shared_resource_included_once() {
        let params = EncodingParameters::new().with_include_paths(["author", "comments.author"]);
        let document = assemble(RelationshipData::from(Object::from_arc(fixtures::post())), &params);

        assert_eq!(
            included_keys(&document),
            vec!["people:9", "comments:5", "comments:12"]
        );
    }

    #[test]
    fn test_primary_collection_not_duplicated() {
        let author = fixtures::author_with_comments();
        let data: Vec<Object> = author
            .comments
            .iter()
            .cloned()
            .map(Object::from_arc)
            .collect();
        let params = EncodingParameters::new().with_include_paths(["author.comments"]);
        let document = assemble(RelationshipData::from(data), &params);

        let Some(PrimaryData::Collection(entries)) = document.data() else {
            panic!("expected a collection");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(included_keys(&document), vec!["people:9"]);

        let people = &document.included()[0];
        assert_eq!(
            people.relationship("comments").and_then(|r| r.data()),
            Some(&Linkage::Many(vec![
                Identifier::new("comments", "5"),
                Identifier::new("comments", "12"),
            ]))
        );
    }

    #[test]
    fn test_empty_field_set_keeps_intermediate_resource() {
        let params = EncodingParameters::new()
            .with_include_paths(["author.comments"])
            .with_field_set("people", Vec::<String>::new());
        let document = assemble(RelationshipData::from(Object::from_arc(fixtures::post())), &params);

        assert_eq!(
            included_keys(&document),
            vec!["people:9", "comments:5", "comments:12"]
        );
        let people = &document.included()[0];
        assert!(people.attributes().is_none());
        assert!(people.relationships().is_empty());

        let Some(PrimaryData::Single(post)) = document.data() else {
            panic!("expected a single primary resource");
        };
        assert_eq!(
            post.relationship("author").and_then(|r| r.data()),
            Some(&Linkage::One(Identifier::new("people", "9")))
        );
    }

    #[test]
    fn test_field_set_hides_relationship_linkage() {
        let params = EncodingParameters::new()
            .with_include_paths(Vec::<String>::new())
            .with_field_set("posts", ["title"]);
        let document = assemble(RelationshipData::from(Object::from_arc(fixtures::post())), &params);

        let Some(PrimaryData::Single(post)) = document.data() else {
            panic!("expected a single primary resource");
        };
        assert!(post.relationships().is_empty());
        assert_eq!(post.attributes().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_identifiers_only() {
        let registry = fixtures::registry();
        let params = EncodingParameters::new();
        let analyzer = ParameterAnalyzer::new(&params, &registry);
        let parser = Parser::new(&registry, &analyzer);
        let mut assembler = DocumentAssembler::new(&analyzer, Document::new()).identifiers_only(true);
        parser
            .parse_with(
                &RelationshipData::from(Object::from_arc(fixtures::post())),
                &mut assembler,
            )
            .unwrap();

        let document = assembler.into_document();
        let Some(PrimaryData::Single(post)) = document.data() else {
            panic!("expected a single primary resource");
        };
        assert!(post.is_identifier_only());
        assert!(document.included().is_empty());
    }
}
