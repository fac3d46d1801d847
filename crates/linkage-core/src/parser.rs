//! Depth-first graph parser
//!
//! Walks primary data and its relationships with an explicit work list
//! instead of native recursion, so deep or adversarial graphs are bounded by
//! `max_depth` rather than by the call stack.

use crate::analyzer::ParameterAnalyzer;
use crate::error::{Error, Result};
use crate::identifier::{Identifier, ResourceKey};
use crate::object::Object;
use crate::relationship::{Relationship, RelationshipData};
use crate::resource::ResourceObject;
use crate::schema::{RelationshipContext, SchemaRegistry};
use crate::stack::{Frame, Position, Stack};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Kind of structural event emitted while walking the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ResourceStarted,
    NullResourceStarted,
    EmptyCollectionStarted,
    ResourceCompleted,
}

/// An event together with the frame it was emitted for
#[derive(Debug, Clone)]
pub struct ParseEvent {
    kind: EventKind,
    frame: Frame,
}

impl ParseEvent {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn level(&self) -> usize {
        self.frame.level()
    }

    pub fn path(&self) -> &str {
        self.frame.path()
    }

    pub fn resource_key(&self) -> Option<ResourceKey> {
        self.frame.resource().map(|resource| resource.key())
    }

    pub fn is_circular(&self) -> bool {
        self.frame.is_circular()
    }
}

/// Receives parser events in traversal order
///
/// `stack.current()` is the frame the event is about; its ancestors are
/// available through the stack.
pub trait ParserHandler {
    fn handle(&mut self, kind: EventKind, stack: &Stack) -> Result<()>;
}

#[derive(Default)]
struct EventCollector {
    events: Vec<ParseEvent>,
}

impl ParserHandler for EventCollector {
    fn handle(&mut self, kind: EventKind, stack: &Stack) -> Result<()> {
        self.events.push(ParseEvent {
            kind,
            frame: stack.current().clone(),
        });
        Ok(())
    }
}

enum Item {
    Null,
    EmptyCollection,
    Resource(Object),
    Identifier(Identifier),
}

impl Item {
    fn from_data(data: &RelationshipData) -> Vec<Item> {
        match data {
            RelationshipData::Null => vec![Item::Null],
            RelationshipData::Identifier(identifier) => vec![Item::Identifier(identifier.clone())],
            RelationshipData::Resource(object) => vec![Item::Resource(object.clone())],
            RelationshipData::Identifiers(items) if items.is_empty() => vec![Item::EmptyCollection],
            RelationshipData::Resources(items) if items.is_empty() => vec![Item::EmptyCollection],
            RelationshipData::Identifiers(items) => {
                items.iter().cloned().map(Item::Identifier).collect()
            }
            RelationshipData::Resources(items) => items.iter().cloned().map(Item::Resource).collect(),
        }
    }
}

struct Visit {
    position: Position,
    relationship: Option<Rc<Relationship>>,
    item: Item,
}

enum Task {
    Visit(Visit),
    Complete,
}

/// Graph parser
///
/// Every visited node produces a started event, then the events of its
/// children, then `ResourceCompleted`. A resource already present in an
/// ancestor frame is reported once with `ResourceStarted` (flagged circular)
/// and neither expanded nor completed.
pub struct Parser<'a> {
    registry: &'a SchemaRegistry,
    analyzer: &'a ParameterAnalyzer<'a>,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn new(registry: &'a SchemaRegistry, analyzer: &'a ParameterAnalyzer<'a>) -> Self {
        Self {
            registry,
            analyzer,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Walk `data` and collect the events
    pub fn parse(&self, data: &RelationshipData) -> Result<Vec<ParseEvent>> {
        let mut collector = EventCollector::default();
        self.parse_with(data, &mut collector)?;
        Ok(collector.events)
    }

    /// Walk `data`, feeding every event to `handler`
    pub fn parse_with<H: ParserHandler + ?Sized>(
        &self,
        data: &RelationshipData,
        handler: &mut H,
    ) -> Result<()> {
        tracing::debug!(
            "Parsing {} ({} root item(s)), max depth {}",
            data.variant_name(),
            data.len(),
            self.max_depth
        );

        let mut stack = Stack::new();
        let mut tasks: Vec<Task> = Item::from_data(data)
            .into_iter()
            .rev()
            .map(|item| {
                Task::Visit(Visit {
                    position: Position::primary(),
                    relationship: None,
                    item,
                })
            })
            .collect();

        let mut visited = 0usize;
        while let Some(task) = tasks.pop() {
            match task {
                Task::Complete => {
                    handler.handle(EventKind::ResourceCompleted, &stack)?;
                    stack.pop();
                }
                Task::Visit(visit) => {
                    visited += 1;
                    self.visit(visit, &mut stack, &mut tasks, handler)?;
                }
            }
        }

        tracing::debug!("Parse finished, {} node(s) visited", visited);
        Ok(())
    }

    fn visit<H: ParserHandler + ?Sized>(
        &self,
        visit: Visit,
        stack: &mut Stack,
        tasks: &mut Vec<Task>,
        handler: &mut H,
    ) -> Result<()> {
        let Visit {
            position,
            relationship,
            item,
        } = visit;

        if position.level() > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let mut frame = Frame::new(position);
        if let Some(relationship) = relationship {
            frame = frame.with_relationship(relationship);
        }

        let object = match item {
            Item::Null => return Self::leaf(frame, EventKind::NullResourceStarted, stack, tasks, handler),
            Item::EmptyCollection => {
                return Self::leaf(frame, EventKind::EmptyCollectionStarted, stack, tasks, handler)
            }
            Item::Identifier(identifier) => {
                let frame = frame.with_resource(Rc::new(ResourceObject::from_identifier(identifier)));
                return Self::leaf(frame, EventKind::ResourceStarted, stack, tasks, handler);
            }
            Item::Resource(object) => object,
        };

        let schema = self.registry.schema_for(&object)?;
        let is_primary = frame.level() <= 1;
        let root_type = if is_primary {
            schema.resource_type().to_string()
        } else {
            stack.root_type().unwrap_or_default().to_string()
        };

        let expand = is_primary || self.analyzer.is_path_included(frame.path(), &root_type);
        let include = if expand {
            self.analyzer
                .include_relationships(Some(frame.path()), &root_type)
        } else {
            BTreeSet::new()
        };

        let resource = schema.create_resource(
            &object,
            self.analyzer.field_set(schema.resource_type()),
            &RelationshipContext::new(&include, is_primary),
        )?;
        let is_circular = !is_primary && stack.contains(&resource.key());
        let resource = Rc::new(resource);

        stack.push(frame.with_resource(resource.clone()).circular(is_circular));
        handler.handle(EventKind::ResourceStarted, stack)?;

        if is_circular {
            tracing::trace!(
                "Circular reference to {} at '{}', not expanding",
                resource.key(),
                stack.current().path()
            );
            stack.pop();
            return Ok(());
        }

        tasks.push(Task::Complete);
        if !expand {
            return Ok(());
        }

        let position = stack.current().position().clone();
        let mut children = Vec::new();
        for (name, relationship) in resource.relationships() {
            let child = position.child(resource.resource_type(), name);
            let wanted = self.analyzer.is_path_included(child.path(), &root_type)
                || self
                    .analyzer
                    .is_field_in_field_set(resource.resource_type(), name);
            if !wanted {
                continue;
            }
            let Some(data) = relationship.data() else {
                continue;
            };
            for item in Item::from_data(data) {
                children.push(Task::Visit(Visit {
                    position: child.clone(),
                    relationship: Some(relationship.clone()),
                    item,
                }));
            }
        }
        tasks.extend(children.into_iter().rev());

        Ok(())
    }

    fn leaf<H: ParserHandler + ?Sized>(
        frame: Frame,
        kind: EventKind,
        stack: &mut Stack,
        tasks: &mut Vec<Task>,
        handler: &mut H,
    ) -> Result<()> {
        stack.push(frame);
        handler.handle(kind, stack)?;
        tasks.push(Task::Complete);
        Ok(())
    }
}
