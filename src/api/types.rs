// src/api/types.rs
//! Request and result types for listing notes.

use crate::constants::DEFAULT_PER_PAGE;
use crate::types::{Note, NoteTag};

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub tag: Option<NoteTag>,
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: None,
            tag: None,
        }
    }
}

impl NoteQuery {
    /// A query for one page. Page numbers start at 1; 0 is raised to 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page,
            ..Self::default()
        }
    }

    /// Sets the free-text filter. Blank text means no filter.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    pub fn with_tag(mut self, tag: Option<NoteTag>) -> Self {
        self.tag = tag;
        self
    }

    /// Query-string pairs, omitting filters that are not set.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(tag) = self.tag {
            pairs.push(("tag", tag.as_str().to_string()));
        }
        pairs
    }
}

/// One page of notes plus the counts needed to paginate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotePage {
    pub notes: Vec<Note>,
    /// Number of matching notes, when the service reports it.
    pub total: Option<u64>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl NotePage {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_filters_are_omitted() {
        let query = NoteQuery::new(2, 10).with_search("   ");
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "2".to_string()), ("perPage", "10".to_string())]
        );
    }

    #[test]
    fn filters_are_appended_when_set() {
        let query = NoteQuery::new(1, 12)
            .with_search("milk")
            .with_tag(Some(NoteTag::Shopping));
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page", "1".to_string()),
                ("perPage", "12".to_string()),
                ("search", "milk".to_string()),
                ("tag", "Shopping".to_string()),
            ]
        );
    }

    #[test]
    fn page_zero_is_raised_to_one() {
        assert_eq!(NoteQuery::new(0, 10).page, 1);
    }
}
