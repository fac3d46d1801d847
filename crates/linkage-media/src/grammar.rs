//! Header grammar
//!
//! ```text
//! media-range = token "/" token *( OWS ";" OWS token "=" ( token / quoted-string ) )
//! accept      = media-range *( OWS "," OWS media-range )
//! qvalue      = ( "0" [ "." 0*3DIGIT ] ) / ( "1" [ "." 0*3("0") ] )
//! ```

use nom::{
    branch::alt,
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{anychar, char, none_of, space0},
    combinator::{all_consuming, map, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};

/// Media type as written, before validation and normalization
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawMediaType<'a> {
    pub main_type: &'a str,
    pub sub_type: &'a str,
    pub parameters: Vec<(&'a str, String)>,
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_while1(is_token_char)(input)
}

/// `"..."` with backslash escapes; returns the unquoted value
fn quoted_string(input: &str) -> IResult<&str, String> {
    let body = nom::bytes::complete::escaped_transform(none_of("\\\""), '\\', anychar);
    map(delimited(char('"'), opt(body), char('"')), Option::unwrap_or_default)(input)
}

fn parameter(input: &str) -> IResult<&str, (&str, String)> {
    preceded(
        tuple((space0, char(';'), space0)),
        separated_pair(token, char('='), alt((quoted_string, map(token, String::from)))),
    )(input)
}

fn media_range(input: &str) -> IResult<&str, RawMediaType<'_>> {
    map(
        tuple((token, char('/'), token, many0(parameter))),
        |(main_type, _, sub_type, parameters)| RawMediaType {
            main_type,
            sub_type,
            parameters,
        },
    )(input)
}

/// A single media type, e.g. a `Content-Type` value
pub(crate) fn media_type(input: &str) -> Option<RawMediaType<'_>> {
    all_consuming(delimited(space0, media_range, space0))(input)
        .ok()
        .map(|(_, raw)| raw)
}

/// Comma separated media ranges of an `Accept` value
pub(crate) fn accept(input: &str) -> Option<Vec<RawMediaType<'_>>> {
    let list = separated_list1(tuple((space0, char(','), space0)), media_range);
    all_consuming(delimited(space0, list, space0))(input)
        .ok()
        .map(|(_, ranges)| ranges)
}

fn qvalue(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(
            char('0'),
            opt(pair(char('.'), take_while_m_n(0, 3, |c: char| c.is_ascii_digit()))),
        )),
        recognize(pair(
            char('1'),
            opt(pair(char('.'), take_while_m_n(0, 3, |c: char| c == '0'))),
        )),
    ))(input)
}

/// Quality weight in `0..=1` with at most three decimals
pub(crate) fn quality(input: &str) -> Option<f32> {
    let (_, text) = all_consuming(qvalue)(input).ok()?;
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_range_with_parameters() {
        let raw = media_type(" text/html ; charset=UTF-8;level=\"1\" ").unwrap();
        assert_eq!(raw.main_type, "text");
        assert_eq!(raw.sub_type, "html");
        assert_eq!(
            raw.parameters,
            vec![("charset", "UTF-8".to_string()), ("level", "1".to_string())]
        );
    }

    #[test]
    fn test_quoted_string_escapes() {
        let raw = media_type(r#"text/plain;title="a \"quoted\" value";empty="""#).unwrap();
        assert_eq!(raw.parameters[0].1, r#"a "quoted" value"#);
        assert_eq!(raw.parameters[1].1, "");
    }

    #[test]
    fn test_malformed_input() {
        assert!(media_type("").is_none());
        assert!(media_type("text").is_none());
        assert!(media_type("text/").is_none());
        assert!(media_type("text/html;charset").is_none());
        assert!(media_type("text/html, text/plain").is_none());
        assert!(accept("text/html,").is_none());
    }

    #[test]
    fn test_accept_list() {
        let ranges = accept("text/html, application/json;q=0.5 ,*/*").unwrap();
        let types: Vec<(&str, &str)> = ranges.iter().map(|r| (r.main_type, r.sub_type)).collect();
        assert_eq!(types, vec![("text", "html"), ("application", "json"), ("*", "*")]);
    }

    #[test]
    fn test_quality_values() {
        assert_eq!(quality("1"), Some(1.0));
        assert_eq!(quality("1.000"), Some(1.0));
        assert_eq!(quality("0.5"), Some(0.5));
        assert_eq!(quality("0.125"), Some(0.125));
        assert_eq!(quality("1.5"), None);
        assert_eq!(quality("0.1234"), None);
        assert_eq!(quality("2"), None);
        assert_eq!(quality("-0.1"), None);
    }
}
