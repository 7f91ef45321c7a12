// src/api/parser.rs
//! Turns raw HTTP responses into domain values or typed errors.
//!
//! Parsing is kept separate from I/O so every branch can be exercised with a
//! hand-built [`ApiResponse`].

use super::client::ApiResponse;
use super::responses::{ErrorBody, NotesResponse};
use super::types::{NotePage, NoteQuery};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::AppError;
use crate::types::Note;
use reqwest::StatusCode;

/// Parse any notes service response into `T`, or into the error it carries.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

/// Builds the error for a rejected request, using the server's message when
/// the body carries one.
fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.best_message().map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    log::debug!("{} from {}: {}", status, url, message);
    AppError::Api { status, message }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// Parse the body of `GET /notes`.
pub fn parse_notes_response(
    result: ApiResponse<String>,
    query: &NoteQuery,
) -> Result<NotePage, AppError> {
    let response: NotesResponse = parse_api_response(result)?;
    Ok(response.into_page(query))
}

/// Parse a single note, as returned by create and delete.
pub fn parse_note_response(result: ApiResponse<String>) -> Result<Note, AppError> {
    parse_api_response(result)
}
