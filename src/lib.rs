// src/lib.rs
//! notehub library: a client for the NoteHub notes service.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`, `FieldErrors`
//! - **Configuration**: `CommandLineInput`, `AppConfig`, `ClientConfig`
//! - **Domain types**: `Note`, `NoteId`, `NoteTag`, `NewNote`, `ApiToken`
//! - **API client**: `NoteRepository`, `NoteHttpClient`, `NoteQuery`, `NotePage`
//! - **Query cache**: `QueryCache`, `QueryKey`, `QueryState`, `QueryObserver`
//! - **Search debouncing**: `Debouncer`, `DebounceTimer`
//! - **Application shell**: `NotesApp`, `ListView`, `NoteForm`, `PaginationControl`

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod notify;
pub mod query;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, Result};
pub use crate::types::{FieldErrors, FormField, ValidationError};

// --- Configuration ---
pub use crate::config::{AppConfig, ClientConfig, CommandLineInput};

// --- Domain Types ---
pub use crate::types::{
    validate_note_fields, ApiToken, NewNote, Note, NoteId, NoteTag, UnknownTag, ValidatedUrl,
};

// --- API Client ---
pub use crate::api::{
    client::ApiResponse, NoteHttpClient, NotePage, NoteQuery, NoteRepository,
};

// --- Query Cache ---
pub use crate::query::{
    CacheEvent, CacheEventKind, FetchStatus, KeySegment, QueryCache, QueryCacheConfig,
    QueryError, QueryKey, QueryObserver, QueryOutcome, QueryState, QueryStatus,
};

// --- Notification & Debouncing ---
pub use crate::debounce::{DebounceTimer, Debouncer};
pub use crate::notify::{Listeners, Subscription};

// --- Application Shell ---
pub use crate::app::{
    ListView, NoteForm, NoteMutations, NotesApp, PageChange, PageItem, PaginationControl,
    SearchPagePolicy, ShellConfig, ShellEvent, ShellSnapshot, ShellState,
};
