// src/query/state.rs
//! Observable state of one cache entry.

use crate::error::AppError;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

/// Errors are shared between every observer of a key.
pub type QueryError = Arc<AppError>;

/// Outcome of one fetch as seen by every awaiting caller.
pub type QueryOutcome<T> = Result<T, QueryError>;

/// Whether the entry has ever produced data or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No fetch has settled yet.
    Pending,
    Success,
    Error,
}

/// Whether a request for the entry is currently on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub fetch_status: FetchStatus,
    /// Last successful payload. Survives later errors and background refetches.
    pub data: Option<T>,
    pub error: Option<QueryError>,
    pub data_updated_at: Option<Instant>,
    /// Set by invalidation, cleared by the next successful fetch.
    pub is_invalidated: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<T> QueryState<T> {
    pub fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            fetch_status: FetchStatus::Idle,
            data: None,
            error: None,
            data_updated_at: None,
            is_invalidated: false,
        }
    }

    /// Pending with a request in flight: nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.fetch_status == FetchStatus::Fetching
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_status == FetchStatus::Fetching
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Whether the data should be refreshed on the next request for the key.
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        if self.is_invalidated {
            return true;
        }
        match self.data_updated_at {
            Some(updated) => updated.elapsed() >= stale_time,
            None => true,
        }
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.fetch_status = FetchStatus::Fetching;
    }

    pub(crate) fn resolve(&mut self, data: T) {
        self.status = QueryStatus::Success;
        self.fetch_status = FetchStatus::Idle;
        self.data = Some(data);
        self.error = None;
        self.data_updated_at = Some(Instant::now());
        self.is_invalidated = false;
    }

    pub(crate) fn reject(&mut self, error: QueryError) {
        self.status = QueryStatus::Error;
        self.fetch_status = FetchStatus::Idle;
        self.error = Some(error);
    }

    pub(crate) fn abandon_fetch(&mut self) {
        self.fetch_status = FetchStatus::Idle;
    }
}
