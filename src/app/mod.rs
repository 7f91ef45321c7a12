//! The notes application: shell state, list view, create form, pagination
//! and the mutations that tie them to the query cache.

mod form;
mod mutations;
mod pagination;
pub mod render;
mod shell;
mod state;
mod view;

pub use form::NoteForm;
pub use mutations::NoteMutations;
pub use pagination::{PageChange, PageItem, PaginationControl};
pub use shell::{NotesApp, ShellConfig, ShellSnapshot};
pub use state::{SearchPagePolicy, ShellEvent, ShellState};
pub use view::ListView;
