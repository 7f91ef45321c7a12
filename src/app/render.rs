// src/app/render.rs
//! Plain-text rendering of the shell for the terminal front-end.

use super::form::NoteForm;
use super::pagination::{PageItem, PaginationControl};
use super::shell::ShellSnapshot;
use super::view::ListView;
use crate::types::{FormField, Note};
use std::fmt::Write;

const RULE: &str = "----------------------------------------";

/// One full frame: toolbar, list area and the form when the modal is open.
pub fn render_snapshot(snapshot: &ShellSnapshot, form: Option<&NoteForm>) -> String {
    let mut out = String::new();
    let state = &snapshot.state;

    let _ = write!(out, "NoteHub | search: {:?}", state.raw_search);
    if state.raw_search != state.search {
        let _ = write!(out, " (showing {:?})", state.search);
    }
    if snapshot.query.is_fetching() && !snapshot.query.is_loading() {
        out.push_str(" | refreshing");
    }
    out.push('\n');

    if let Some(pagination) = &snapshot.pagination {
        let _ = writeln!(out, "{}", render_pagination(pagination));
    }
    let _ = writeln!(out, "{}", RULE);

    match &snapshot.view {
        ListView::Populated { notes } => {
            for note in notes {
                let deleting = state.deleting.as_ref() == Some(&note.id);
                out.push_str(&render_note(note, deleting));
            }
        }
        other => {
            if let Some(text) = other.status_text() {
                let _ = writeln!(out, "{}", text);
            }
        }
    }
    let _ = writeln!(out, "{}", RULE);

    match (state.is_modal_open, form) {
        (true, Some(form)) => out.push_str(&render_form(form)),
        _ => out.push_str("[Create note +]  /new\n"),
    }
    out
}

/// `< 1 2 [3] 4 5 ... 9 10 >`, with disabled arrows shown as spaces.
pub fn render_pagination(pagination: &PaginationControl) -> String {
    pagination
        .items()
        .iter()
        .map(|item| match item {
            PageItem::Previous { enabled } => (if *enabled { "<" } else { " " }).to_string(),
            PageItem::Next { enabled } => (if *enabled { ">" } else { " " }).to_string(),
            PageItem::Page { number, active: true } => format!("[{}]", number),
            PageItem::Page { number, .. } => number.to_string(),
            PageItem::Break { .. } => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_note(note: &Note, deleting: bool) -> String {
    let action = if deleting { "Deleting..." } else { "Delete" };
    let mut out = format!("{}  [{}]  ({}: /d {})\n", note.title, note.tag, action, note.id);
    if !note.content.is_empty() {
        let _ = writeln!(out, "    {}", note.content);
    }
    out
}

pub fn render_form(form: &NoteForm) -> String {
    let mut out = String::from("New note\n");
    for field in FormField::ALL {
        let _ = write!(out, "  {:<8} {:?}", field.as_str(), form.value(field));
        if let Some(error) = form.error(field) {
            let _ = write!(out, "  <- {}", error);
        }
        out.push('\n');
    }
    if let Some(error) = form.submit_error() {
        let _ = writeln!(out, "  ! {}", error);
    }
    let _ = writeln!(out, "  [{}]  [Cancel: /cancel]", form.submit_label());
    out
}
