//! Path pattern matching module
//!
//! Matches request paths against patterns such as `/user/:id`.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// A single pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text, compared ASCII case-insensitively
    Literal(String),
    /// Named parameter, binds one non-empty path segment
    Param(String),
}

/// Compiled path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Parameters bound by a successful match, in pattern order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Get a bound parameter by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl PathPattern {
    /// Compile a pattern. Segments starting with `:` are parameters.
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// Original pattern text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning the bound parameters
    ///
    /// Parameter values are percent-decoded; a segment that does not decode
    /// to valid UTF-8 is bound raw.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = Vec::new();
        let mut parts = split_path(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if !lit.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.push((name.clone(), decode_segment(part).into_owned()));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }

        Some(PathParams(params))
    }
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}

/// Split a path into segments, ignoring the leading slash and one trailing slash
///
/// `//` keeps its trailing slash, so it never collapses to the root.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = if trimmed.len() > 1 {
        trimmed.strip_suffix('/').unwrap_or(trimmed)
    } else {
        trimmed
    };
    // "" must yield no segments rather than one empty one
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}
