//! Media types

use crate::error::{MediaTypeError, Result};
use crate::grammar::{self, RawMediaType};
use std::fmt;
use std::str::FromStr;

/// A `type/subtype` pair with parameters
///
/// Type, subtype and parameter names are stored lowercase; parameter values
/// keep their case. Equality ignores parameter order.
#[derive(Debug, Clone)]
pub struct MediaType {
    main_type: String,
    sub_type: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    pub const WILDCARD: &'static str = "*";
    pub const JSON_API_TYPE: &'static str = "application";
    pub const JSON_API_SUB_TYPE: &'static str = "vnd.api+json";
    pub const JSON_API_MEDIA_TYPE: &'static str = "application/vnd.api+json";

    pub fn new(main_type: impl AsRef<str>, sub_type: impl AsRef<str>) -> Self {
        Self {
            main_type: main_type.as_ref().to_ascii_lowercase(),
            sub_type: sub_type.as_ref().to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// `application/vnd.api+json`
    pub fn json_api() -> Self {
        Self::new(Self::JSON_API_TYPE, Self::JSON_API_SUB_TYPE)
    }

    /// Add or replace a parameter
    pub fn with_parameter(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.parameters.push((name, value)),
        }
        self
    }

    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.parameters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_wildcard(&self) -> bool {
        self.main_type == Self::WILDCARD || self.sub_type == Self::WILDCARD
    }

    /// Whether `other` satisfies this (possibly wildcard) media range
    ///
    /// Parameters only have to agree where both sides carry them.
    pub fn matches(&self, other: &MediaType) -> bool {
        let type_matches = self.main_type == Self::WILDCARD || self.main_type == other.main_type;
        let sub_type_matches = self.sub_type == Self::WILDCARD || self.sub_type == other.sub_type;
        type_matches && sub_type_matches && self.shared_parameters_equal(other)
    }

    /// Exact identity: same type, subtype and parameter set
    pub fn equals(&self, other: &MediaType) -> bool {
        self.main_type == other.main_type
            && self.sub_type == other.sub_type
            && self.parameters.len() == other.parameters.len()
            && self.shared_parameters_equal(other)
            && self
                .parameters
                .iter()
                .all(|(name, _)| other.parameter(name).is_some())
    }

    fn shared_parameters_equal(&self, other: &MediaType) -> bool {
        self.parameters.iter().all(|(name, value)| {
            other
                .parameters
                .iter()
                .find(|(n, _)| n == name)
                .map_or(true, |(_, v)| v == value)
        })
    }

    /// Validate and normalize a parsed media type
    pub(crate) fn from_raw(raw: RawMediaType<'_>, source: &str) -> Result<Self> {
        if raw.main_type == Self::WILDCARD && raw.sub_type != Self::WILDCARD {
            return Err(MediaTypeError::InvalidMediaType(source.to_string()));
        }

        let mut media_type = Self::new(raw.main_type, raw.sub_type);
        for (name, value) in raw.parameters {
            if media_type.parameter(name).is_some() {
                return Err(MediaTypeError::InvalidParameter(format!(
                    "duplicate parameter '{}' in '{}'",
                    name, source
                )));
            }
            media_type = media_type.with_parameter(name, value);
        }
        Ok(media_type)
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for MediaType {}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    /// Parse a single media type such as a `Content-Type` value
    fn from_str(s: &str) -> Result<Self> {
        let raw = grammar::media_type(s).ok_or_else(|| MediaTypeError::InvalidMediaType(s.to_string()))?;
        Self::from_raw(raw, s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        for (name, value) in &self.parameters {
            let is_token = !value.is_empty()
                && value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c));
            if is_token {
                write!(f, ";{}={}", name, value)?;
            } else {
                write!(f, ";{}=\"{}\"", name, value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_normalizes_case() {
        let media_type = parse("Application/VND.API+JSON; Charset=UTF-8");
        assert_eq!(media_type.main_type(), "application");
        assert_eq!(media_type.sub_type(), "vnd.api+json");
        assert_eq!(media_type.parameter("charset"), Some("UTF-8"));
        assert_eq!(media_type.parameter("CHARSET"), Some("UTF-8"));
    }

    #[test]
    fn test_json_api_constant() {
        assert_eq!(MediaType::json_api(), parse(MediaType::JSON_API_MEDIA_TYPE));
        assert_eq!(MediaType::json_api().to_string(), "application/vnd.api+json");
    }

    #[test]
    fn test_invalid_media_types() {
        assert!(matches!(
            "application".parse::<MediaType>(),
            Err(MediaTypeError::InvalidMediaType(_))
        ));
        assert!(matches!(
            "*/json".parse::<MediaType>(),
            Err(MediaTypeError::InvalidMediaType(_))
        ));
        assert!(matches!(
            "text/html;a=1;A=2".parse::<MediaType>(),
            Err(MediaTypeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_wildcard_matching() {
        let json = MediaType::new("application", "json");
        assert!(parse("*/*").matches(&json));
        assert!(parse("application/*").matches(&json));
        assert!(!parse("text/*").matches(&json));
        assert!(!json.matches(&parse("application/xml")));
    }

    #[test]
    fn test_matching_compares_shared_parameters_only() {
        let registered = parse("application/json;charset=utf-8");
        assert!(parse("application/json").matches(&registered));
        assert!(parse("application/json;version=2").matches(&registered));
        assert!(parse("application/json;charset=utf-8").matches(&registered));
        assert!(!parse("application/json;charset=latin1").matches(&registered));
    }

    #[test]
    fn test_equals_is_exact_but_order_insensitive() {
        let a = parse("application/json;a=1;b=2");
        assert!(a.equals(&parse("application/json;b=2;a=1")));
        assert!(!a.equals(&parse("application/json;a=1")));
        assert!(!a.equals(&parse("application/json;a=1;b=3")));
        assert!(!parse("application/json").equals(&a));
        assert!(!parse("*/*").equals(&parse("application/json")));
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let media_type = MediaType::new("text", "plain")
            .with_parameter("charset", "utf-8")
            .with_parameter("title", "two words");
        assert_eq!(media_type.to_string(), "text/plain;charset=utf-8;title=\"two words\"");
        assert_eq!(parse(&media_type.to_string()), media_type);
    }
}
