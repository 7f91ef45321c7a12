// src/app/mutations.rs
//! Create and delete, followed by invalidation of every note list.
//!
//! Nothing is patched into the cache locally: a successful mutation marks
//! all `["notes", ..]` entries stale and the observed one is fetched again,
//! so the list always reflects the server's own filtering and paging.

use crate::api::{NotePage, NoteRepository};
use crate::error::AppError;
use crate::query::{QueryCache, QueryKey};
use crate::types::{NewNote, Note, NoteId};
use std::sync::Arc;

#[derive(Clone)]
pub struct NoteMutations {
    repository: Arc<dyn NoteRepository>,
    cache: QueryCache<NotePage>,
}

impl NoteMutations {
    pub fn new(repository: Arc<dyn NoteRepository>, cache: QueryCache<NotePage>) -> Self {
        Self { repository, cache }
    }

    pub async fn create(&self, note: &NewNote) -> Result<Note, AppError> {
        match self.repository.create_note(note).await {
            Ok(created) => {
                log::info!("Created note {} ({:?})", created.id, created.title);
                self.cache.invalidate(&QueryKey::all_notes());
                Ok(created)
            }
            Err(e) => {
                log::error!("Failed to create note: {}", e);
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: &NoteId) -> Result<Note, AppError> {
        match self.repository.delete_note(id).await {
            Ok(deleted) => {
                log::info!("Deleted note {}", deleted.id);
                self.cache.invalidate(&QueryKey::all_notes());
                Ok(deleted)
            }
            Err(e) => {
                log::error!("Failed to delete note {}: {}", id, e);
                Err(e)
            }
        }
    }
}
