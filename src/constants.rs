// src/constants.rs
//! Domain constants that define the operational boundaries of the client.
//!
//! Each constant is named for the domain concept it constrains. Reading them
//! top to bottom tells you how the client talks to the notes service, how long
//! it waits for the user to stop typing and what a valid note looks like.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notes service
// ---------------------------------------------------------------------------

/// Root of the notes REST API. Every endpoint is resolved relative to it.
pub const API_BASE_URL: &str = "https://notehub-public.goit.study/api";

/// Environment variable holding the bearer token sent with every request.
pub const TOKEN_ENV_VAR: &str = "NOTEHUB_TOKEN";

/// Resource name shared by the REST path and the query-cache key prefix.
pub const NOTES_RESOURCE: &str = "notes";

/// Notes requested per page when the caller does not say otherwise.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upper bound accepted for `perPage`.
pub const MAX_PER_PAGE: u32 = 50;

/// How long to wait for a TCP connection to the service.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a single request may take end to end.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Interaction timing
// ---------------------------------------------------------------------------

/// Quiet period the search input must hold before it becomes the query term.
pub const SEARCH_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Inactive cache entries are evicted after this long without an observer.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

// ---------------------------------------------------------------------------
// Note field limits
// ---------------------------------------------------------------------------

/// Shortest accepted note title, in characters.
pub const TITLE_MIN_CHARS: usize = 3;

/// Longest accepted note title, in characters.
pub const TITLE_MAX_CHARS: usize = 50;

/// Longest accepted note body, in characters.
pub const CONTENT_MAX_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Pagination widget
// ---------------------------------------------------------------------------

/// Page links shown around the current page.
pub const PAGE_RANGE_DISPLAYED: u32 = 5;

/// Page links always shown at each end of the control.
pub const MARGIN_PAGES_DISPLAYED: u32 = 2;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
