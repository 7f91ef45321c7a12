//! Notes service interaction: the ability to list, create and delete notes.
//!
//! Business logic depends on [`NoteRepository`], never on HTTP details, so the
//! query cache and the shell can be driven by an in-memory repository in tests.

pub mod client;
pub mod parser;
mod responses;
mod types;

use crate::error::AppError;
use crate::types::{NewNote, Note, NoteId};

pub use client::NoteHttpClient;
pub use types::{NotePage, NoteQuery};

/// The remote notes store.
///
/// Implementations are stateless apart from their credentials: every call is
/// a single attempt with no retries.
#[async_trait::async_trait]
pub trait NoteRepository: Send + Sync {
    /// One page of notes matching the query.
    async fn list_notes(&self, query: &NoteQuery) -> Result<NotePage, AppError>;

    /// Stores a new note; the service assigns its id.
    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError>;

    /// Removes a note and returns its last known representation.
    async fn delete_note(&self, id: &NoteId) -> Result<Note, AppError>;
}
