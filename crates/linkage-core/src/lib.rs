//! Linkage Core - Resource graph encoder
//!
//! This crate walks arbitrary (possibly cyclic) domain object graphs through
//! user supplied schemas and assembles JSON:API style documents with
//! deduplicated included resources, sparse field-sets and include paths.

pub mod analyzer;
pub mod assembler;
pub mod document;
pub mod encoder;
pub mod error;
pub mod error_object;
pub mod identifier;
pub mod link;
pub mod object;
pub mod params;
pub mod parser;
pub mod relationship;
pub mod resource;
pub mod schema;
pub mod stack;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analyzer::ParameterAnalyzer;
pub use assembler::DocumentAssembler;
pub use document::{Document, Linkage, PrimaryData, RelationshipEntry, ResourceEntry};
pub use encoder::{Encoder, EncoderOptions};
pub use error::{Error, Result};
pub use error_object::{ErrorObject, ErrorSource};
pub use identifier::{Identifier, ResourceKey};
pub use link::{Link, Links};
pub use object::Object;
pub use params::EncodingParameters;
pub use parser::{EventKind, ParseEvent, Parser, ParserHandler};
pub use relationship::{Relationship, RelationshipData};
pub use resource::ResourceObject;
pub use schema::{RelationshipContext, Schema, SchemaRegistry};
pub use stack::{Frame, Position, Stack};
