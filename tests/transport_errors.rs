// tests/transport_errors.rs
//! A service that cannot be reached shows up as a generic network error.

mod common;

use common::eventually;
use notehub::{
    AppError, ClientConfig, ListView, NoteHttpClient, NoteId, NotePage, NoteQuery,
    NoteRepository, NotesApp, QueryCache, ShellConfig, ValidatedUrl,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

// Nothing listens on port 1, so every connection is refused.
const UNREACHABLE: &str = "http://127.0.0.1:1/api";

fn unreachable_client() -> NoteHttpClient {
    let config = ClientConfig {
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
        ..ClientConfig::new(ValidatedUrl::parse(UNREACHABLE).unwrap())
    };
    NoteHttpClient::new(&config).unwrap()
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let err = unreachable_client()
        .list_notes(&NoteQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Transport(_)), "{:?}", err);
    assert_eq!(err.display_message(), "Network Error");
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn unreachable_service_shows_network_error_and_delete_changes_nothing() {
    let cache = QueryCache::<NotePage>::default();
    let app = NotesApp::new(Arc::new(unreachable_client()), &cache, ShellConfig::default());

    eventually(|| matches!(app.list_view(), ListView::Error { .. })).await;
    let before = app.list_view();
    assert_eq!(
        before.status_text().as_deref(),
        Some("Error loading notes: Network Error")
    );

    let err = app.delete_note(&NoteId::new("n1")).await.unwrap_err();
    assert_eq!(err.display_message(), "Network Error");
    assert_eq!(app.state().deleting, None);
    assert_eq!(app.list_view(), before);
}
