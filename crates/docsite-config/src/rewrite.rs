//! Path rewrite patterns mapping source file paths to published paths.
//!
//! Patterns are `/`-separated. A `:name` segment captures exactly one path
//! segment and a trailing `:name*` segment captures every remaining segment
//! (possibly none). Every other segment must match literally.

use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// Compiled rewrite pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutePattern {
    original: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let trimmed = pattern.trim().trim_start_matches('/');
        let mut segments = Vec::new();
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        for (idx, part) in parts.iter().enumerate() {
            let Some(name) = part.strip_prefix(':') else {
                if part.is_empty() {
                    return Err(format!("empty segment in pattern '{pattern}'"));
                }
                segments.push(Segment::Literal((*part).to_string()));
                continue;
            };

            let (name, catch_all) = match name.strip_suffix('*') {
                Some(stripped) => (stripped, true),
                None => (name, false),
            };

            if name.is_empty()
                || !name
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
            {
                return Err(format!("invalid parameter '{part}' in pattern '{pattern}'"));
            }

            if catch_all {
                if idx + 1 != parts.len() {
                    return Err(format!(
                        "catch-all parameter '{part}' must be the last segment of '{pattern}'"
                    ));
                }
                segments.push(Segment::CatchAll(name.to_string()));
            } else {
                segments.push(Segment::Param(name.to_string()));
            }
        }

        Ok(RoutePattern {
            original: pattern.to_string(),
            segments,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Names of every parameter declared by the pattern.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path` against the pattern, returning captured parameter values.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let trimmed = path.trim_start_matches('/');
        let parts: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut captured = HashMap::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(idx) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(idx).filter(|part| !part.is_empty())?;
                    captured.insert(name.clone(), (*value).to_string());
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(idx..).unwrap_or_default().join("/");
                    captured.insert(name.clone(), rest);
                    return Some(captured);
                }
            }
        }

        if parts.len() == self.segments.len() {
            Some(captured)
        } else {
            None
        }
    }

    /// Substitute captured values into the pattern.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut parts = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => parts.push(literal.clone()),
                Segment::Param(name) | Segment::CatchAll(name) => {
                    if let Some(value) = values.get(name).filter(|value| !value.is_empty()) {
                        parts.push(value.clone());
                    }
                }
            }
        }
        parts.join("/")
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(value: &str) -> RoutePattern {
        RoutePattern::parse(value).expect("valid pattern")
    }

    #[test]
    fn catch_all_captures_remaining_segments() {
        let from = pattern("/memory-bank/:path*");
        let captured = from.captures("memory-bank/notes/progress.md").unwrap();
        assert_eq!(captured["path"], "notes/progress.md");
        assert_eq!(pattern("/:path*").render(&captured), "notes/progress.md");
    }

    #[test]
    fn catch_all_matches_zero_segments() {
        let captured = pattern("guide/:rest*").captures("guide").unwrap();
        assert_eq!(captured["rest"], "");
    }

    #[test]
    fn single_params_need_exactly_one_segment() {
        let from = pattern("packages/:pkg/docs.md");
        let captured = from.captures("packages/core/docs.md").unwrap();
        assert_eq!(captured["pkg"], "core");
        assert!(from.captures("packages/docs.md").is_none());
        assert!(from.captures("packages/core/extra/docs.md").is_none());
        assert_eq!(pattern(":pkg/index.md").render(&captured), "core/index.md");
    }

    #[test]
    fn literals_must_match() {
        assert!(pattern("guide/intro.md").captures("guide/other.md").is_none());
        assert!(pattern("guide/intro.md").captures("guide/intro.md").is_some());
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(RoutePattern::parse(":rest*/tail").is_err());
        assert!(RoutePattern::parse("a/:/b").is_err());
        assert!(RoutePattern::parse("a//b").is_err());
    }

    #[test]
    fn lists_declared_params() {
        let names: Vec<_> = pattern(":a/x/:b*").params().map(str::to_string).collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
