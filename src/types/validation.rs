// src/types/validation.rs
//! Field rules for new notes. Runs entirely client-side; the server remains
//! the final authority and may still reject what passes here.

use super::{FieldErrors, FormField, NewNote, NoteTag, ValidationError};
use crate::constants::{CONTENT_MAX_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS};

/// Checks raw form input and builds a [`NewNote`] when every field passes.
///
/// Lengths are counted in characters, not bytes. All fields are checked so
/// the caller can show every message at once.
pub fn validate_note_fields(
    title: &str,
    content: &str,
    tag: &str,
) -> Result<NewNote, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title_len = title.chars().count();
    if title.is_empty() {
        errors.insert(ValidationError::Required {
            field: FormField::Title,
        });
    } else if title_len < TITLE_MIN_CHARS {
        errors.insert(ValidationError::TooShort {
            field: FormField::Title,
            min: TITLE_MIN_CHARS,
        });
    } else if title_len > TITLE_MAX_CHARS {
        errors.insert(ValidationError::TooLong {
            field: FormField::Title,
            max: TITLE_MAX_CHARS,
        });
    }

    if content.chars().count() > CONTENT_MAX_CHARS {
        errors.insert(ValidationError::TooLong {
            field: FormField::Content,
            max: CONTENT_MAX_CHARS,
        });
    }

    let parsed_tag = if tag.is_empty() {
        errors.insert(ValidationError::Required {
            field: FormField::Tag,
        });
        None
    } else {
        match tag.parse::<NoteTag>() {
            Ok(tag) => Some(tag),
            Err(_) => {
                errors.insert(ValidationError::NotOneOf {
                    field: FormField::Tag,
                    allowed: NoteTag::ALLOWED,
                });
                None
            }
        }
    };

    match parsed_tag {
        Some(tag) if errors.is_empty() => Ok(NewNote::from_validated(
            title.to_string(),
            content.to_string(),
            tag,
        )),
        _ => Err(errors),
    }
}
