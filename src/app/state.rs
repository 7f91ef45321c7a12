// src/app/state.rs
//! Top-level UI state and the events the shell emits on each transition.

use crate::query::QueryKey;
use crate::types::NoteId;

/// What happens to the current page when the settled search term changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPagePolicy {
    /// Stay on the current page number.
    #[default]
    KeepPage,
    /// Go back to page 1.
    ResetToFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    /// 1-indexed, never below 1.
    pub page: u32,
    /// Search box contents, updated on every keystroke.
    pub raw_search: String,
    /// Debounced term used in the query key.
    pub search: String,
    pub is_modal_open: bool,
    /// Note whose deletion is in flight.
    pub deleting: Option<NoteId>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            page: 1,
            raw_search: String::new(),
            search: String::new(),
            is_modal_open: false,
            deleting: None,
        }
    }
}

impl ShellState {
    /// Key of the list currently on screen.
    pub fn query_key(&self) -> QueryKey {
        QueryKey::notes(self.page, &self.search)
    }

    /// Moves to `page` (raised to 1). Returns whether the page changed.
    pub(crate) fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Adopts a settled search term. Returns whether the query key changed.
    pub(crate) fn settle_search(&mut self, term: String, policy: SearchPagePolicy) -> bool {
        if self.search == term {
            return false;
        }
        self.search = term;
        if policy == SearchPagePolicy::ResetToFirst {
            self.page = 1;
        }
        true
    }
}

/// Emitted by [`NotesApp`](super::NotesApp) after each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    PageChanged(u32),
    SearchTyped(String),
    SearchSettled(String),
    ModalToggled(bool),
    /// The state of the active list query changed.
    QueryUpdated(QueryKey),
    DeleteStarted(NoteId),
    DeleteFinished(NoteId),
}
