//! Segment-wise wildcard patterns for route and controller identifiers
//!
//! Supports:
//! - Exact segments: `admin/users` matches `admin/users`
//! - Single-segment wildcard: `admin/*/edit` matches `admin/users/edit`
//! - Trailing wildcard: `admin/*` matches `admin/users` and `admin/users/edit`, not `admin`
//! - Universal wildcard: `*` matches any identifier
//! - In-segment globs: `admin/user-*` matches `admin/user-list`
//!
//! Matching is case-insensitive.

use std::fmt;
use wildmatch::WildMatch;

use crate::error::{RbacError, Result};

/// Segment separator for route names
pub const ROUTE_SEPARATOR: char = '/';

/// Segment separator for controller identifiers
pub const CONTROLLER_SEPARATOR: char = '\\';

const WILDCARD: &str = "*";

#[derive(Debug, Clone)]
enum Segment {
    Any,
    Literal(String),
    Glob(WildMatch),
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Any => !segment.is_empty(),
            Segment::Literal(literal) => literal == segment,
            Segment::Glob(glob) => glob.matches(segment),
        }
    }
}

/// A compiled identifier pattern
///
/// # Examples
///
/// ```rust
/// use rbac::guard::Pattern;
///
/// let pattern = Pattern::parse("admin/*", '/').unwrap();
/// assert!(pattern.matches("admin/users"));
/// assert!(pattern.matches("Admin/Users/Edit"));
/// assert!(!pattern.matches("admin"));
/// assert!(!pattern.matches("blog/posts"));
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    separator: char,
    segments: Vec<Segment>,
    trailing_wildcard: bool,
}

impl Pattern {
    /// Compiles `raw`, splitting on `separator`
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidPattern` for empty patterns, empty segments
    /// and `**` segments.
    pub fn parse(raw: &str, separator: char) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RbacError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern cannot be empty".to_string(),
            });
        }

        let lowered = trimmed.to_lowercase();
        let mut parts: Vec<&str> = lowered.split(separator).collect();

        let trailing_wildcard = parts.last() == Some(&WILDCARD);
        if trailing_wildcard {
            parts.pop();
        }

        let segments = parts
            .into_iter()
            .map(|part| Self::compile_segment(raw, part))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            separator,
            segments,
            trailing_wildcard,
        })
    }

    fn compile_segment(raw: &str, part: &str) -> Result<Segment> {
        if part.is_empty() {
            return Err(RbacError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern contains an empty segment".to_string(),
            });
        }
        if part.contains("**") {
            return Err(RbacError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "'**' is not supported, use a trailing '*' segment".to_string(),
            });
        }

        Ok(if part == WILDCARD {
            Segment::Any
        } else if part.contains(['*', '?']) {
            Segment::Glob(WildMatch::new(part))
        } else {
            Segment::Literal(part.to_string())
        })
    }

    /// Pattern source, trimmed
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Checks whether `identifier` matches this pattern
    pub fn matches(&self, identifier: &str) -> bool {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return false;
        }

        let parts: Vec<&str> = identifier.split(self.separator).collect();

        let shape_ok = if self.trailing_wildcard {
            parts.len() > self.segments.len()
                && parts[self.segments.len()..].iter().all(|part| !part.is_empty())
        } else {
            parts.len() == self.segments.len()
        };

        shape_ok
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| segment.matches(part))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
