use std::fmt;
use thiserror::Error;

mod domain_types;
mod note;
mod validation;

pub use domain_types::*;
pub use note::*;
pub use validation::*;

/// The inputs of the note creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Title,
    Content,
    Tag,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Title, FormField::Content, FormField::Tag];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Content => "content",
            FormField::Tag => "tag",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required")]
    Required { field: FormField },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: FormField, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: FormField, max: usize },

    #[error("{field} must be one of the following values: {allowed}")]
    NotOneOf {
        field: FormField,
        allowed: &'static str,
    },

    #[error("Invalid API token: {reason}")]
    InvalidToken { reason: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{name} out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

impl ValidationError {
    /// The form input this error belongs to, if it is field-scoped.
    pub fn field(&self) -> Option<FormField> {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NotOneOf { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Per-field validation messages collected from one form check.
///
/// Holds at most one error per field: the first rule a field fails is the one
/// the user sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<ValidationError>,
}

impl FieldErrors {
    /// Records an error unless its field already has one.
    pub fn insert(&mut self, error: ValidationError) {
        let field = error.field();
        if field.is_some() && self.errors.iter().any(|e| e.field() == field) {
            return;
        }
        self.errors.push(error);
    }

    pub fn get(&self, field: FormField) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == Some(field))
    }

    pub fn clear_field(&mut self, field: FormField) {
        self.errors.retain(|e| e.field() != Some(field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|e| match e.field() {
                Some(field) => format!("{}: {}", field, e),
                None => e.to_string(),
            })
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for FieldErrors {}
