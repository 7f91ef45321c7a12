// src/app/view.rs
//! What the note list area shows for a given query state.

use crate::api::NotePage;
use crate::query::{QueryState, QueryStatus};
use crate::types::Note;

/// Exactly one of these is shown at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Error { message: String },
    Empty,
    Populated { notes: Vec<Note> },
}

impl ListView {
    /// Maps the active query state onto the list area.
    ///
    /// An error wins over previously loaded data, and a success without
    /// notes is the empty state.
    pub fn from_state(state: &QueryState<NotePage>) -> Self {
        match state.status {
            QueryStatus::Pending => ListView::Loading,
            QueryStatus::Error => ListView::Error {
                message: state
                    .error
                    .as_ref()
                    .map(|e| e.display_message())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            QueryStatus::Success => match &state.data {
                Some(page) if !page.is_empty() => ListView::Populated {
                    notes: page.notes.clone(),
                },
                _ => ListView::Empty,
            },
        }
    }

    /// The status line shown instead of the list, if any.
    pub fn status_text(&self) -> Option<String> {
        match self {
            ListView::Loading => Some("Loading...".to_string()),
            ListView::Error { message } => Some(format!("Error loading notes: {}", message)),
            ListView::Empty => Some("No notes found".to_string()),
            ListView::Populated { .. } => None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        match self {
            ListView::Populated { notes } => notes,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::types::{NoteId, NoteTag};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::sync::Arc;

    fn note(id: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: format!("Note {}", id),
            content: String::new(),
            tag: NoteTag::Work,
            created_at: None,
            updated_at: None,
        }
    }

    fn page(notes: Vec<Note>) -> NotePage {
        NotePage {
            total: Some(notes.len() as u64),
            notes,
            page: 1,
            per_page: 10,
            total_pages: 1,
        }
    }

    #[test]
    fn pending_is_loading() {
        let mut state = QueryState::<NotePage>::pending();
        state.begin_fetch();
        let view = ListView::from_state(&state);
        assert_eq!(view, ListView::Loading);
        assert_eq!(view.status_text().as_deref(), Some("Loading..."));
    }

    #[test]
    fn error_shows_server_message() {
        let mut state = QueryState::<NotePage>::pending();
        state.reject(Arc::new(AppError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid token".to_string(),
        }));
        assert_eq!(
            ListView::from_state(&state).status_text().as_deref(),
            Some("Error loading notes: Invalid token")
        );
    }

    #[test]
    fn error_wins_over_stale_data() {
        let mut state = QueryState::pending();
        state.resolve(page(vec![note("1")]));
        state.reject(Arc::new(AppError::Api {
            status: StatusCode::BAD_GATEWAY,
            message: String::new(),
        }));
        assert_eq!(
            ListView::from_state(&state),
            ListView::Error {
                message: "Request failed with status code 502".to_string()
            }
        );
    }

    #[test]
    fn empty_and_populated() {
        let mut state = QueryState::pending();
        state.resolve(page(Vec::new()));
        assert_eq!(ListView::from_state(&state), ListView::Empty);
        assert_eq!(ListView::Empty.status_text().as_deref(), Some("No notes found"));

        state.resolve(page(vec![note("1"), note("2")]));
        let view = ListView::from_state(&state);
        assert_eq!(view.notes().len(), 2);
        assert_eq!(view.status_text(), None);
    }

    #[test]
    fn background_refetch_keeps_showing_data() {
        let mut state = QueryState::pending();
        state.resolve(page(vec![note("1")]));
        state.is_invalidated = true;
        state.begin_fetch();
        assert!(matches!(ListView::from_state(&state), ListView::Populated { .. }));
    }
}
