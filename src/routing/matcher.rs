//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Normalize paths (strip one leading and one trailing `/`)
//! - Split patterns into literal and placeholder segments
//! - Split request paths into percent-decoded segments
//! - Match request segments against a pattern, capturing placeholder values
//!
//! # Design Decisions
//! - Segment counts must be equal: no wildcards, no optional segments
//! - Literal segments compare byte-for-byte (case-sensitive)
//! - First literal mismatch aborts the candidate
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::string::FromUtf8Error;

use crate::routing::error::RouteError;

/// Strip a single leading and a single trailing `/`.
pub fn normalize_path(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Split a path into segments and percent-decode each one.
///
/// Decoding happens after splitting, so an encoded `/` stays inside its segment.
pub fn decode_segments(path: &str) -> Result<Vec<String>, FromUtf8Error> {
    normalize_path(path)
        .split('/')
        .map(|segment| urlencoding::decode(segment).map(Cow::into_owned))
        .collect()
}

/// Derive a route name from a normalized path by dropping every character
/// that is neither ASCII alphanumeric nor ASCII whitespace. Vertical tab
/// counts as whitespace here, unlike in `char::is_ascii_whitespace`.
pub fn derive_name(path: &str) -> String {
    path.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || c == '\x0b')
        .collect()
}

/// One element of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// `{name}`: matches any single segment and captures it under `name`.
    Placeholder(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Placeholder(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }
}

/// Placeholder values captured while matching, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(HashMap<String, String>);

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Captures {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A compiled route pattern such as `users/{id}/posts/{postId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    /// Normalized source text, kept for messages and URL generation errors.
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern. The path is normalized first.
    ///
    /// A bare `{}` segment is rejected: it would capture under an empty name.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let raw = normalize_path(path).to_string();
        let segments: Vec<Segment> = raw.split('/').map(Segment::parse).collect();

        if segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(name) if name.is_empty()))
        {
            return Err(RouteError::EmptyPlaceholder { path: raw });
        }

        Ok(Self { raw, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of placeholder segments.
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(_)))
            .count()
    }

    /// Match already-split request segments.
    ///
    /// Returns the captures when every segment matches, `None` otherwise.
    pub fn match_segments(&self, request: &[&str]) -> Option<Captures> {
        if self.segments.len() != request.len() {
            return None;
        }

        let mut captures = Captures::new();
        for (segment, value) in self.segments.iter().zip(request) {
            match segment {
                Segment::Placeholder(name) => captures.insert(name.as_str(), *value),
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(captures)
    }

    /// Match a request path (normalized here).
    pub fn matches(&self, path: &str) -> Option<Captures> {
        let request: Vec<&str> = normalize_path(path).split('/').collect();
        self.match_segments(&request)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/users/42/"), "users/42");
        assert_eq!(normalize_path("users"), "users");
        assert_eq!(normalize_path("/"), "");
        assert_eq!(normalize_path(""), "");
        // Only one slash on each side is removed
        assert_eq!(normalize_path("//a//"), "/a/");
    }

    #[test]
    fn test_derive_name() {
        assert_eq!(derive_name("users/{id}/posts"), "usersidposts");
        assert_eq!(derive_name("about us"), "about us");
        assert_eq!(derive_name(""), "");
        assert_eq!(derive_name("a\tb\x0bc\r\n-d"), "a\tb\x0bc\r\nd");
    }

    #[test]
    fn test_decode_segments() {
        assert_eq!(
            decode_segments("/users/ada%20lovelace/Zo%C3%AB/").unwrap(),
            vec!["users", "ada lovelace", "Zo\u{eb}"]
        );
        // Encoded slash stays inside its segment
        assert_eq!(decode_segments("a%2Fb/c").unwrap(), vec!["a/b", "c"]);
        assert!(decode_segments("users/%FF").is_err());
    }

    #[test]
    fn test_parse_segments() {
        let pattern = PathPattern::parse("/users/{id}/").unwrap();
        assert_eq!(pattern.as_str(), "users/{id}");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("users".into()),
                Segment::Placeholder("id".into())
            ]
        );
        assert_eq!(pattern.arity(), 1);

        // A lone brace is a literal
        let pattern = PathPattern::parse("{").unwrap();
        assert_eq!(pattern.segments(), &[Segment::Literal("{".into())]);
    }

    #[test]
    fn test_empty_placeholder_rejected() {
        let err = PathPattern::parse("users/{}").unwrap_err();
        assert_eq!(
            err,
            RouteError::EmptyPlaceholder {
                path: "users/{}".into()
            }
        );
    }

    #[test]
    fn test_match_with_placeholders() {
        let pattern = PathPattern::parse("users/{id}/posts/{postId}").unwrap();
        let captures = pattern.matches("users/42/posts/7").unwrap();
        assert_eq!(captures.get("id"), Some("42"));
        assert_eq!(captures.get("postId"), Some("7"));
        assert_eq!(captures.len(), 2);
    }

    #[test]
    fn test_literal_mismatch() {
        let pattern = PathPattern::parse("users/{id}/posts").unwrap();
        assert!(pattern.matches("users/42/comments").is_none());
        // Case-sensitive
        assert!(pattern.matches("Users/42/posts").is_none());
    }

    #[test]
    fn test_segment_count_must_match() {
        let pattern = PathPattern::parse("users/{id}").unwrap();
        assert!(pattern.matches("users").is_none());
        assert!(pattern.matches("users/42/extra").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("home").is_none());
    }
}
