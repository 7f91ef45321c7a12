// src/api/client.rs
//! Thin HTTP client for the notes service.
//!
//! Handles authentication, URL building and raw request/response plumbing.
//! Interpreting bodies is left to [`super::parser`].

use super::parser;
use super::types::{NotePage, NoteQuery};
use crate::config::ClientConfig;
use crate::constants::NOTES_RESOURCE;
use crate::error::AppError;
use crate::types::{ApiToken, NewNote, Note, NoteId};
use reqwest::{header, Client, Response, Url};
use serde::Serialize;

/// A thin wrapper around reqwest Client for notes service requests.
#[derive(Clone)]
pub struct NoteHttpClient {
    client: Client,
    base_url: Url,
}

impl NoteHttpClient {
    /// Creates a new HTTP client. Without a token, requests go out
    /// unauthenticated and the service decides what to do with them.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(config.token.as_ref())?)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.as_url().clone(),
        })
    }

    /// Creates the default headers for every request.
    fn create_headers(token: Option<&ApiToken>) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&token.bearer()).map_err(|e| {
                AppError::InvalidConfiguration(format!("Invalid API token format: {}", e))
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Resolves path segments against the base URL, escaping each segment.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::InvalidConfiguration(format!(
                    "base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Makes a GET request with query-string parameters.
    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<Response, AppError> {
        let url = self.endpoint_url(segments)?;
        log::debug!("GET {} {:?}", url, query);
        Ok(self.client.get(url).query(query).send().await?)
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<Response, AppError> {
        let url = self.endpoint_url(segments)?;
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, segments: &[&str]) -> Result<Response, AppError> {
        let url = self.endpoint_url(segments)?;
        log::debug!("DELETE {}", url);
        Ok(self.client.delete(url).send().await?)
    }
}

#[async_trait::async_trait]
impl super::NoteRepository for NoteHttpClient {
    async fn list_notes(&self, query: &NoteQuery) -> Result<NotePage, AppError> {
        let response = self
            .get(&[NOTES_RESOURCE], &query.to_query_pairs())
            .await?;
        let result = extract_response_text(response).await?;
        parser::parse_notes_response(result, query)
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        let response = self.post(&[NOTES_RESOURCE], note).await?;
        let result = extract_response_text(response).await?;
        parser::parse_note_response(result)
    }

    async fn delete_note(&self, id: &NoteId) -> Result<Note, AppError> {
        let response = self.delete(&[NOTES_RESOURCE, id.as_str()]).await?;
        let result = extract_response_text(response).await?;
        parser::parse_note_response(result)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
