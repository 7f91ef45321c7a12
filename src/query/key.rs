// src/query/key.rs
//! Cache keys: a resource name followed by the parameters of one fetch.

use crate::constants::NOTES_RESOURCE;
use std::fmt;

/// One component of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySegment {
    Text(String),
    Number(u64),
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Text(s.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        KeySegment::Text(s)
    }
}

impl From<u32> for KeySegment {
    fn from(n: u32) -> Self {
        KeySegment::Number(u64::from(n))
    }
}

impl From<u64> for KeySegment {
    fn from(n: u64) -> Self {
        KeySegment::Number(n)
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Text(s) => write!(f, "{:?}", s),
            KeySegment::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Identifies one logical query. Equal keys share one cache entry and at
/// most one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// A key naming a whole resource; used as an invalidation prefix.
    pub fn resource(name: &str) -> Self {
        Self(vec![KeySegment::from(name)])
    }

    /// Appends a parameter.
    pub fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// `["notes", page, search]`, the key of one note list view.
    pub fn notes(page: u32, search: &str) -> Self {
        Self::resource(NOTES_RESOURCE).with(page).with(search)
    }

    /// Prefix matching every note list regardless of page or search.
    pub fn all_notes() -> Self {
        Self::resource(NOTES_RESOURCE)
    }

    /// Whether `prefix` matches this key segment by segment.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
