//! Linkage Media - Media type parsing and codec negotiation
//!
//! Parses `Accept` and `Content-Type` header values and picks a registered
//! encoder or decoder for them.

pub mod accept;
pub mod error;
mod grammar;
pub mod matcher;
pub mod media_type;

pub use accept::{parse_accept_header, AcceptMediaType};
pub use error::{MediaTypeError, Result};
pub use matcher::{CodecMatcher, DecoderMatch, EncoderMatch, Factory};
pub use media_type::MediaType;
