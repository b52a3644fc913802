// Mon Aug 3 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a qualified scope path.
///
/// An anonymous namespace contributes a sentinel segment carrying a unique
/// site id, so two separately-declared anonymous-namespace types never
/// collide. The sentinel renders as an empty string when a path is joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeSegment {
    Named(String),
    Anonymous(u64),
}

impl ScopeSegment {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }

    pub fn display_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Anonymous(_) => "",
        }
    }

    /// Structural comparison: all anonymous sentinels compare equal here,
    /// unlike `PartialEq` which keeps sites distinct.
    pub fn structurally_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Anonymous(_), Self::Anonymous(_)) => true,
            _ => false,
        }
    }
}

/// Ordered scope names from outermost to innermost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopePath {
    segments: Vec<ScopeSegment>,
}

impl ScopePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<ScopeSegment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: ScopeSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[ScopeSegment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [ScopeSegment] {
        &mut self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains_anonymous(&self) -> bool {
        self.segments.iter().any(ScopeSegment::is_anonymous)
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.structurally_eq(b))
    }

    /// Join with `::`, rendering anonymous segments empty.
    pub fn display(&self) -> String {
        self.segments
            .iter()
            .map(ScopeSegment::display_str)
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// A name qualified by its scope path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedName {
    pub scope: ScopePath,
    pub name: String,
}

impl ScopedName {
    pub fn new(scope: ScopePath, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self {
            scope: ScopePath::root(),
            name: name.into(),
        }
    }

    pub fn fullname(&self) -> String {
        if self.scope.is_root() {
            self.name.clone()
        } else {
            format!("{}::{}", self.scope.display(), self.name)
        }
    }

    /// `Outer::Inner::Name` -> `Outer__Inner__Name`; anonymous segments
    /// are skipped entirely in the flattened form.
    pub fn flattened(&self) -> String {
        let mut parts: Vec<&str> = self
            .scope
            .segments()
            .iter()
            .filter(|s| !s.is_anonymous())
            .map(ScopeSegment::display_str)
            .collect();
        parts.push(&self.name);
        parts.join("__")
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name == other.name && self.scope.structurally_eq(&other.scope)
    }
}

impl fmt::Display for ScopedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullname_joining() {
        let mut path = ScopePath::root();
        path.push(ScopeSegment::Named("Outer".to_string()));
        path.push(ScopeSegment::Named("Inner".to_string()));
        let name = ScopedName::new(path, "B");
        assert_eq!(name.fullname(), "Outer::Inner::B");
    }

    #[test]
    fn test_anonymous_renders_empty() {
        let mut path = ScopePath::root();
        path.push(ScopeSegment::Anonymous(0));
        let name = ScopedName::new(path, "C");
        assert_eq!(name.fullname(), "::C");
    }

    #[test]
    fn test_anonymous_sites_distinct_but_structurally_equal() {
        let a = ScopeSegment::Anonymous(0);
        let b = ScopeSegment::Anonymous(1);
        assert_ne!(a, b);
        assert!(a.structurally_eq(&b));
    }

    #[test]
    fn test_flattened() {
        let mut path = ScopePath::root();
        path.push(ScopeSegment::Named("Outer".to_string()));
        path.push(ScopeSegment::Anonymous(3));
        path.push(ScopeSegment::Named("Inner".to_string()));
        let name = ScopedName::new(path, "T");
        assert_eq!(name.flattened(), "Outer__Inner__T");
    }
}
