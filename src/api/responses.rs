// src/api/responses.rs
//! Wire shapes of the notes service responses.
//!
//! These mirror the JSON exactly and are converted to domain types before
//! leaving the `api` module.

use super::types::{NotePage, NoteQuery};
use crate::types::Note;
use serde::Deserialize;

/// Body of `GET /notes`.
///
/// Only `notes` and `totalPages` are guaranteed. A missing `page` or
/// `perPage` is taken from the request; a missing `total` stays unknown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesResponse {
    pub notes: Vec<Note>,
    pub total_pages: u32,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl NotesResponse {
    /// Converts to the domain page, taking a missing page or page size from
    /// `query`.
    pub fn into_page(self, query: &NoteQuery) -> NotePage {
        NotePage {
            total: self.total,
            page: self.page.unwrap_or(query.page),
            per_page: self.per_page.unwrap_or(query.per_page),
            total_pages: self.total_pages,
            notes: self.notes,
        }
    }
}

/// Error body of a rejected request. Every field is optional because
/// different failure paths of the service produce different shapes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The most specific human-readable text in the body.
    pub fn best_message(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}
