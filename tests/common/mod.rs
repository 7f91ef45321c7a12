// tests/common/mod.rs
//! Shared test utilities: an in-memory notes service and polling helpers.

#![allow(dead_code)]

use notehub::{AppError, NewNote, Note, NoteId, NotePage, NoteQuery, NoteRepository, NoteTag};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// A notes service kept in memory. Counts calls and can be told to answer
/// slowly or to fail.
#[derive(Default)]
pub struct InMemoryNotes {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicU64,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    delay: Mutex<Duration>,
    list_failure: Mutex<Option<(StatusCode, String)>>,
    create_failure: Mutex<Option<(StatusCode, String)>>,
}

impl InMemoryNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service holding `count` notes titled "Note 1", "Note 2", ...
    pub fn seeded(count: usize) -> Self {
        let service = Self::new();
        for i in 1..=count {
            service.insert(&format!("Note {}", i), NoteTag::Todo);
        }
        service
    }

    pub fn insert(&self, title: &str, tag: NoteTag) -> NoteId {
        let id = NoteId::new(format!("n{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        self.notes.lock().push(Note {
            id: id.clone(),
            title: title.to_string(),
            content: String::new(),
            tag,
            created_at: None,
            updated_at: None,
        });
        id
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn fail_lists(&self, status: StatusCode, message: &str) {
        *self.list_failure.lock() = Some((status, message.to_string()));
    }

    pub fn fail_creates(&self, status: StatusCode, message: &str) {
        *self.create_failure.lock() = Some((status, message.to_string()));
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn api_error(status: StatusCode, message: &str) -> AppError {
    AppError::Api {
        status,
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl NoteRepository for InMemoryNotes {
    async fn list_notes(&self, query: &NoteQuery) -> Result<NotePage, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if let Some((status, message)) = self.list_failure.lock().clone() {
            return Err(api_error(status, &message));
        }

        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<Note> = self
            .notes
            .lock()
            .iter()
            .filter(|note| match &needle {
                Some(needle) => {
                    note.title.to_lowercase().contains(needle)
                        || note.content.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|note| query.tag.map_or(true, |tag| note.tag == tag))
            .cloned()
            .collect();

        let per_page = query.per_page.max(1) as usize;
        let total = matching.len();
        let total_pages = total.div_ceil(per_page) as u32;
        let notes = matching
            .into_iter()
            .skip((query.page as usize - 1) * per_page)
            .take(per_page)
            .collect();

        Ok(NotePage {
            notes,
            total: Some(total as u64),
            page: query.page,
            per_page: query.per_page,
            total_pages,
        })
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if let Some((status, message)) = self.create_failure.lock().clone() {
            return Err(api_error(status, &message));
        }

        let id = self.insert(note.title(), note.tag());
        let mut notes = self.notes.lock();
        let created = notes
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| {
                n.content = note.content().to_string();
                n.clone()
            });
        created.ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "insert failed"))
    }

    async fn delete_note(&self, id: &NoteId) -> Result<Note, AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let mut notes = self.notes.lock();
        match notes.iter().position(|n| &n.id == id) {
            Some(index) => Ok(notes.remove(index)),
            None => Err(api_error(StatusCode::NOT_FOUND, "Note not found")),
        }
    }
}

/// Polls `check` until it holds, advancing time in small steps.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
