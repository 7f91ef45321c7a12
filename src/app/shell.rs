// src/app/shell.rs
//! Application shell: owns page, search and modal state and keeps the
//! active list query in step with them.
//!
//! The shell observes exactly one cache key at a time, the key built from the
//! current page and the settled search term. Whenever either changes it
//! observes the new key and releases the old one. Cache events for any other
//! key are ignored, so a slow response for a page the user already left
//! cannot change what is on screen.

use super::form::NoteForm;
use super::mutations::NoteMutations;
use super::pagination::{PageChange, PaginationControl};
use super::state::{SearchPagePolicy, ShellEvent, ShellState};
use super::view::ListView;
use crate::api::{NotePage, NoteQuery, NoteRepository};
use crate::constants::{DEFAULT_PER_PAGE, SEARCH_DEBOUNCE_WINDOW};
use crate::debounce::Debouncer;
use crate::error::AppError;
use crate::notify::{Listeners, Subscription};
use crate::query::{CacheEvent, QueryCache, QueryKey, QueryObserver, QueryState};
use crate::types::{NewNote, Note, NoteId};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellConfig {
    pub per_page: u32,
    pub search_window: Duration,
    pub search_page_policy: SearchPagePolicy,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            search_window: SEARCH_DEBOUNCE_WINDOW,
            search_page_policy: SearchPagePolicy::default(),
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct ShellSnapshot {
    pub state: ShellState,
    pub key: QueryKey,
    pub query: QueryState<NotePage>,
    pub view: ListView,
    /// Absent when the last loaded page reports at most one page.
    pub pagination: Option<PaginationControl>,
}

struct ShellInner {
    repository: Arc<dyn NoteRepository>,
    cache: QueryCache<NotePage>,
    mutations: NoteMutations,
    config: ShellConfig,
    state: Mutex<ShellState>,
    active: Mutex<Option<QueryObserver<NotePage>>>,
    search: Mutex<Debouncer<String>>,
    listeners: Listeners<ShellEvent>,
}

/// The notes application without its front-end.
///
/// Must be created inside a Tokio runtime.
pub struct NotesApp {
    inner: Arc<ShellInner>,
    _cache_subscription: Subscription,
    search_listener: JoinHandle<()>,
}

impl NotesApp {
    /// Builds the shell and starts loading page 1.
    pub fn new(
        repository: Arc<dyn NoteRepository>,
        cache: &QueryCache<NotePage>,
        config: ShellConfig,
    ) -> Self {
        let debouncer = Debouncer::new(String::new(), config.search_window);
        let mut settled = debouncer.subscribe();

        let inner = Arc::new(ShellInner {
            mutations: NoteMutations::new(Arc::clone(&repository), cache.clone()),
            repository,
            cache: cache.clone(),
            config,
            state: Mutex::new(ShellState::default()),
            active: Mutex::new(None),
            search: Mutex::new(debouncer),
            listeners: Listeners::new(),
        });

        let weak: Weak<ShellInner> = Arc::downgrade(&inner);
        let cache_subscription = cache.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_cache_event(event);
            }
        });

        let weak = Arc::downgrade(&inner);
        let search_listener = tokio::spawn(async move {
            while settled.changed().await.is_ok() {
                let term = settled.borrow_and_update().clone();
                match weak.upgrade() {
                    Some(inner) => inner.apply_search(term),
                    None => break,
                }
            }
        });

        inner.activate();

        Self {
            inner,
            _cache_subscription: cache_subscription,
            search_listener,
        }
    }

    pub fn config(&self) -> ShellConfig {
        self.inner.config
    }

    pub fn state(&self) -> ShellState {
        self.inner.state.lock().clone()
    }

    pub fn active_key(&self) -> QueryKey {
        self.inner.state.lock().query_key()
    }

    pub fn snapshot(&self) -> ShellSnapshot {
        let state = self.state();
        let key = state.query_key();
        let query = self.inner.cache.state(&key).unwrap_or_default();
        let view = ListView::from_state(&query);
        let pagination = query
            .data
            .as_ref()
            .and_then(|page| PaginationControl::new(state.page, page.total_pages));

        ShellSnapshot {
            state,
            key,
            query,
            view,
            pagination,
        }
    }

    pub fn list_view(&self) -> ListView {
        self.snapshot().view
    }

    /// Records a keystroke. The query follows once typing pauses.
    pub fn type_search(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.lock().raw_search = text.clone();
        self.inner.search.lock().push(text.clone());
        self.inner.listeners.emit(&ShellEvent::SearchTyped(text));
    }

    /// Applies the typed search now instead of waiting for the pause.
    pub fn flush_search(&self) {
        let term = {
            let mut search = self.inner.search.lock();
            search.flush();
            search.settled()
        };
        self.inner.apply_search(term);
    }

    /// Shows `page` (raised to 1 if 0).
    pub fn go_to_page(&self, page: u32) {
        let changed = self.inner.state.lock().set_page(page);
        if !changed {
            return;
        }
        let page = page.max(1);
        log::debug!("Page changed to {}", page);
        self.inner.listeners.emit(&ShellEvent::PageChanged(page));
        self.inner.activate();
    }

    pub fn change_page(&self, change: PageChange) {
        self.go_to_page(change.page);
    }

    pub fn open_create_modal(&self) {
        self.inner.set_modal(true);
    }

    pub fn close_create_modal(&self) {
        self.inner.set_modal(false);
    }

    pub fn mutations(&self) -> &NoteMutations {
        &self.inner.mutations
    }

    /// Submits the form. The modal closes only when the note was created.
    pub async fn submit_note(&self, form: &mut NoteForm) -> Result<Note, AppError> {
        let note = form.begin_submit()?;
        let result = self.create_note(&note).await;
        form.finish_submit(&result);
        result
    }

    /// Creates an already validated note and closes the modal on success.
    pub async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        let created = self.inner.mutations.create(note).await?;
        self.close_create_modal();
        Ok(created)
    }

    /// Deletes a note. On failure the list is left as it was.
    pub async fn delete_note(&self, id: &NoteId) -> Result<Note, AppError> {
        self.inner.state.lock().deleting = Some(id.clone());
        self.inner
            .listeners
            .emit(&ShellEvent::DeleteStarted(id.clone()));

        let result = self.inner.mutations.delete(id).await;

        self.inner.state.lock().deleting = None;
        self.inner
            .listeners
            .emit(&ShellEvent::DeleteFinished(id.clone()));
        result
    }

    /// Fetches the active list again.
    pub fn refresh(&self) -> bool {
        let key = self.active_key();
        self.inner.cache.refetch(&key)
    }

    /// Calls `callback` after every shell transition.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ShellEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }
}

impl Drop for NotesApp {
    fn drop(&mut self) {
        self.search_listener.abort();
    }
}

impl ShellInner {
    /// Observes the key for the current state if it is not already observed.
    ///
    /// The new observer is installed only if the state still maps to its key
    /// once the `active` slot is held; otherwise the key is computed again.
    fn activate(&self) {
        loop {
            let (key, query) = self.current_query();
            if self
                .active
                .lock()
                .as_ref()
                .is_some_and(|observer| observer.key() == &key)
            {
                return;
            }

            let repository = Arc::clone(&self.repository);
            let observer = self.cache.observe(key.clone(), move || {
                let repository = Arc::clone(&repository);
                let query = query.clone();
                async move { repository.list_notes(&query).await }
            });

            let previous = {
                let mut active = self.active.lock();
                if self.state.lock().query_key() != key {
                    None
                } else {
                    // The previous key is released only after the new one is observed.
                    Some(active.replace(observer))
                }
            };
            let Some(previous) = previous else {
                log::debug!("State moved on while observing {}, retrying", key);
                continue;
            };
            drop(previous);

            log::debug!("Active query is now {}", key);
            self.listeners.emit(&ShellEvent::QueryUpdated(key));
            return;
        }
    }

    fn current_query(&self) -> (QueryKey, NoteQuery) {
        let state = self.state.lock();
        (
            state.query_key(),
            NoteQuery::new(state.page, self.config.per_page).with_search(state.search.clone()),
        )
    }

    fn apply_search(&self, term: String) {
        let (changed, page_before, page_after) = {
            let mut state = self.state.lock();
            let before = state.page;
            let changed = state.settle_search(term.clone(), self.config.search_page_policy);
            (changed, before, state.page)
        };
        if !changed {
            return;
        }

        log::debug!("Search settled on {:?}", term);
        self.listeners.emit(&ShellEvent::SearchSettled(term));
        if page_after != page_before {
            self.listeners.emit(&ShellEvent::PageChanged(page_after));
        }
        self.activate();
    }

    fn set_modal(&self, open: bool) {
        {
            let mut state = self.state.lock();
            if state.is_modal_open == open {
                return;
            }
            state.is_modal_open = open;
        }
        self.listeners.emit(&ShellEvent::ModalToggled(open));
    }

    fn on_cache_event(&self, event: &CacheEvent) {
        let active = self.state.lock().query_key();
        if event.key != active {
            log::debug!("Ignoring {:?} for inactive query {}", event.kind, event.key);
            return;
        }
        self.listeners
            .emit(&ShellEvent::QueryUpdated(event.key.clone()));
    }
}
