//! Resource path templates.
//!
//! Elected resources are identified by templates such as
//! `/banking/accounts/{accountId}/transactions`. Matching is done
//! segment-wise: a literal segment must match exactly, a `{param}`
//! segment captures any single segment. A template may match a suffix
//! region of a longer URL (links carry absolute URLs with a host and
//! base-path prefix), in which case the prefix and any query string are
//! preserved by substitution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed resource path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// A parameter captured from a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    /// Parameter name, e.g. `accountId`
    pub name: String,
    /// Captured segment value
    pub value: String,
}

impl PathTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Self {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') && s.len() > 2 {
                    Segment::Param(s[1..s.len() - 1].to_owned())
                } else {
                    Segment::Literal(s.to_owned())
                }
            })
            .collect();
        Self {
            raw: template.to_owned(),
            segments,
        }
    }

    /// The template string as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template declares any path parameters.
    pub fn has_params(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param(_)))
    }

    /// Declared parameter names, in template order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Find the first region of `path` this template matches.
    ///
    /// Returns the segment offset of the match, or `None` when the
    /// template matches nowhere in the path.
    fn match_offset(&self, path_segments: &[&str]) -> Option<usize> {
        if self.segments.is_empty() || path_segments.len() < self.segments.len() {
            return None;
        }
        (0..=path_segments.len() - self.segments.len()).find(|&offset| {
            self.segments
                .iter()
                .zip(&path_segments[offset..])
                .all(|(segment, actual)| match segment {
                    Segment::Literal(expected) => expected == actual,
                    Segment::Param(_) => !actual.is_empty(),
                })
        })
    }

    /// Extract the declared parameters from a concrete path or URL.
    ///
    /// Any query string is ignored. Returns `None` when the path does
    /// not contain a region matching the template.
    pub fn extract_params(&self, path: &str) -> Option<Vec<PathParam>> {
        let (path_part, _) = split_query(path);
        let path_segments: Vec<&str> = path_part.split('/').filter(|s| !s.is_empty()).collect();
        let offset = self.match_offset(&path_segments)?;

        let params = self
            .segments
            .iter()
            .zip(&path_segments[offset..])
            .filter_map(|(segment, actual)| match segment {
                Segment::Param(name) => Some(PathParam {
                    name: name.clone(),
                    value: (*actual).to_owned(),
                }),
                Segment::Literal(_) => None,
            })
            .collect();
        Some(params)
    }

    /// Extract a single named parameter from a concrete path.
    pub fn extract_param(&self, path: &str, name: &str) -> Option<String> {
        self.extract_params(path)?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    /// Rewrite the matched region of `path`, replacing each declared
    /// parameter with the supplied value.
    ///
    /// Prefix segments (scheme, host, base path), suffix segments, and
    /// the query string survive unchanged. Returns `None` when the path
    /// does not match the template or a parameter value is missing.
    pub fn substitute(&self, path: &str, values: &[PathParam]) -> Option<String> {
        let (path_part, query) = split_query(path);
        // Split preserving empty segments so the original shape
        // (leading slash, double slash after the scheme) is rebuilt
        // exactly.
        let raw_segments: Vec<&str> = path_part.split('/').collect();
        let nonempty: Vec<(usize, &str)> = raw_segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, s)| (i, *s))
            .collect();
        let nonempty_views: Vec<&str> = nonempty.iter().map(|(_, s)| *s).collect();
        let offset = self.match_offset(&nonempty_views)?;

        let mut rebuilt: Vec<String> = raw_segments.iter().map(|s| (*s).to_owned()).collect();
        for (template_idx, segment) in self.segments.iter().enumerate() {
            if let Segment::Param(name) = segment {
                let value = values.iter().find(|p| &p.name == name)?.value.clone();
                let (raw_idx, _) = nonempty[offset + template_idx];
                rebuilt[raw_idx] = value;
            }
        }

        let mut result = rebuilt.join("/");
        if let Some(query) = query {
            result.push('?');
            result.push_str(query);
        }
        Some(result)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    }
}
