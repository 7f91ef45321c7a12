// src/app/form.rs
//! The create-note form.
//!
//! Holds the raw text of each input plus the messages from the last
//! validation. Invalid input never reaches the repository; a rejected
//! submission leaves every value in place so the user can fix and retry.

use super::mutations::NoteMutations;
use crate::error::AppError;
use crate::types::{validate_note_fields, FieldErrors, FormField, NewNote, Note, NoteTag, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    title: String,
    content: String,
    tag: String,
    errors: FieldErrors,
    submitting: bool,
    submit_error: Option<String>,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: NoteTag::default().to_string(),
            errors: FieldErrors::default(),
            submitting: false,
            submit_error: None,
        }
    }
}

impl NoteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces one input and clears the message shown for it.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.title = value,
            FormField::Content => self.content = value,
            FormField::Tag => self.tag = value,
        }
        self.errors.clear_field(field);
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Content => &self.content,
            FormField::Tag => &self.tag,
        }
    }

    pub fn error(&self, field: FormField) -> Option<&ValidationError> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message from the last rejected submission.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Label of the submit button.
    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Creating..."
        } else {
            "Create note"
        }
    }

    /// Checks every input and records the resulting messages.
    pub fn validate(&mut self) -> Result<NewNote, FieldErrors> {
        match validate_note_fields(&self.title, &self.content, &self.tag) {
            Ok(note) => {
                self.errors = FieldErrors::default();
                Ok(note)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Validates, then creates the note. The form is cleared only on success.
    pub async fn submit(&mut self, mutations: &NoteMutations) -> Result<Note, AppError> {
        let note = self.begin_submit()?;
        let result = mutations.create(&note).await;
        self.finish_submit(&result);
        result
    }

    /// First half of [`submit`](Self::submit): validates and marks the form
    /// as submitting. The caller sends the returned note and hands the
    /// outcome to [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(&mut self) -> Result<NewNote, AppError> {
        if self.submitting {
            return Err(AppError::InternalError {
                message: "a submission is already in progress".to_string(),
                source: None,
            });
        }
        let note = self.validate()?;
        self.submitting = true;
        self.submit_error = None;
        Ok(note)
    }

    /// Clears the form after a created note, or keeps every input and
    /// records the message after a rejected one.
    pub fn finish_submit(&mut self, result: &Result<Note, AppError>) {
        self.submitting = false;
        match result {
            Ok(_) => self.reset(),
            Err(e) => self.submit_error = Some(e.display_message()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_empty_with_default_tag() {
        let form = NoteForm::new();
        assert_eq!(form.value(FormField::Title), "");
        assert_eq!(form.value(FormField::Tag), "Todo");
        assert_eq!(form.submit_label(), "Create note");
    }

    #[test]
    fn validation_records_messages_per_field() {
        let mut form = NoteForm::new();
        form.set(FormField::Title, "ab");
        form.set(FormField::Tag, "Urgent");

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            form.error(FormField::Title).map(ToString::to_string).as_deref(),
            Some("title must be at least 3 characters")
        );
        assert_eq!(
            form.error(FormField::Tag).map(ToString::to_string).as_deref(),
            Some("tag must be one of the following values: Todo, Work, Personal, Meeting, Shopping")
        );
        assert!(form.error(FormField::Content).is_none());
    }

    #[test]
    fn editing_a_field_clears_only_its_message() {
        let mut form = NoteForm::new();
        form.set(FormField::Tag, "");
        form.validate().unwrap_err();
        assert!(form.error(FormField::Title).is_some());
        assert!(form.error(FormField::Tag).is_some());

        form.set(FormField::Title, "Groceries");
        assert!(form.error(FormField::Title).is_none());
        assert!(form.error(FormField::Tag).is_some());
    }

    #[test]
    fn valid_input_builds_a_new_note() {
        let mut form = NoteForm::new();
        form.set(FormField::Title, "abc");
        form.set(FormField::Content, "x".repeat(500));
        form.set(FormField::Tag, "Shopping");

        let note = form.validate().unwrap();
        assert_eq!(note.title(), "abc");
        assert_eq!(note.tag(), NoteTag::Shopping);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn label_reads_creating_between_begin_and_finish() {
        let mut form = NoteForm::new();
        form.set(FormField::Title, "Dentist");

        form.begin_submit().unwrap();
        assert!(form.is_submitting());
        assert_eq!(form.submit_label(), "Creating...");
        assert!(form.begin_submit().is_err());

        form.finish_submit(&Err(AppError::Api {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        }));
        assert_eq!(form.submit_label(), "Create note");
        assert_eq!(form.submit_error(), Some("boom"));
        assert_eq!(form.value(FormField::Title), "Dentist");
    }

    #[test]
    fn invalid_form_never_starts_submitting() {
        let mut form = NoteForm::new();
        assert!(matches!(form.begin_submit(), Err(AppError::Form(_))));
        assert!(!form.is_submitting());
    }
}
