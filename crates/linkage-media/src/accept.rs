//! `Accept` header parsing

use crate::error::{MediaTypeError, Result};
use crate::grammar;
use crate::media_type::MediaType;
use std::ops::Deref;

/// One media range of an `Accept` header
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptMediaType {
    media_type: MediaType,
    quality: f32,
    position: usize,
}

impl AcceptMediaType {
    pub fn new(media_type: MediaType, quality: f32, position: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(MediaTypeError::InvalidQuality(quality.to_string()));
        }
        Ok(Self {
            media_type,
            quality,
            position,
        })
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Zero-based index in the header
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Deref for AcceptMediaType {
    type Target = MediaType;

    fn deref(&self) -> &MediaType {
        &self.media_type
    }
}

/// Parse an `Accept` header value into media ranges in header order
///
/// The `q` parameter becomes the quality (default 1) and is removed together
/// with any accept-extensions following it.
pub fn parse_accept_header(header: &str) -> Result<Vec<AcceptMediaType>> {
    let ranges = grammar::accept(header).ok_or_else(|| MediaTypeError::InvalidMediaType(header.to_string()))?;

    ranges
        .into_iter()
        .enumerate()
        .map(|(position, mut raw)| {
            let mut quality = 1.0;
            if let Some(q) = raw.parameters.iter().position(|(name, _)| name.eq_ignore_ascii_case("q")) {
                let value = &raw.parameters[q].1;
                quality = grammar::quality(value).ok_or_else(|| MediaTypeError::InvalidQuality(value.clone()))?;
                raw.parameters.truncate(q);
            }
            let media_type = MediaType::from_raw(raw, header)?;
            AcceptMediaType::new(media_type, quality, position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accept_header() {
        let accepted = parse_accept_header("text/html;level=1;q=0.7;ext=x, application/vnd.api+json, */*;q=0.1").unwrap();
        assert_eq!(accepted.len(), 3);

        assert_eq!(accepted[0].main_type(), "text");
        assert_eq!(accepted[0].parameters(), &[("level".to_string(), "1".to_string())]);
        assert_eq!(accepted[0].quality(), 0.7);
        assert_eq!(accepted[0].position(), 0);

        assert_eq!(accepted[1].media_type(), &MediaType::json_api());
        assert_eq!(accepted[1].quality(), 1.0);
        assert_eq!(accepted[1].position(), 1);

        assert!(accepted[2].is_wildcard());
        assert_eq!(accepted[2].quality(), 0.1);
    }

    #[test]
    fn test_quality_name_is_case_insensitive() {
        let accepted = parse_accept_header("text/plain;Q=0.25").unwrap();
        assert_eq!(accepted[0].quality(), 0.25);
        assert!(accepted[0].parameters().is_empty());
    }

    #[test]
    fn test_invalid_quality() {
        assert_eq!(
            parse_accept_header("text/plain;q=1.5"),
            Err(MediaTypeError::InvalidQuality("1.5".to_string()))
        );
        assert!(AcceptMediaType::new(MediaType::new("text", "plain"), -0.5, 0).is_err());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(parse_accept_header("").is_err());
        assert!(parse_accept_header("*/html").is_err());
        assert!(parse_accept_header("text/html;;").is_err());
    }
}
