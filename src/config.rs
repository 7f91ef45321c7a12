// src/config.rs
use crate::app::{SearchPagePolicy, ShellConfig};
use crate::constants::{
    API_BASE_URL, CONNECT_TIMEOUT, DEFAULT_GC_TIME, DEFAULT_PER_PAGE, MAX_PER_PAGE,
    REQUEST_TIMEOUT, SEARCH_DEBOUNCE_WINDOW, TOKEN_ENV_VAR,
};
use crate::error::AppError;
use crate::query::QueryCacheConfig;
use crate::types::{ApiToken, ValidatedUrl, ValidationError};
use clap::Parser;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the NoteHub notes service", long_about = None)]
pub struct CommandLineInput {
    /// Base URL of the notes API
    #[arg(long, default_value = API_BASE_URL)]
    pub base_url: String,

    /// Notes shown per page (1-50)
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Go back to page 1 whenever the search term changes
    #[arg(long, default_value_t = false)]
    pub reset_page_on_search: bool,

    /// Seconds a loaded page counts as fresh (0 = refresh in the background on every visit)
    #[arg(long, default_value_t = 0)]
    pub stale_secs: u64,

    /// Seconds an unused page stays cached for quick back-navigation
    #[arg(long, default_value_t = DEFAULT_GC_TIME.as_secs())]
    pub gc_secs: u64,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Settings for [`crate::api::NoteHttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ValidatedUrl,
    /// Sent as `Authorization: Bearer ...` when present.
    pub token: Option<ApiToken>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Client settings for `base_url` with the standard timeouts and no token.
    pub fn new(base_url: ValidatedUrl) -> Self {
        Self {
            base_url,
            token: None,
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Resolved application configuration, validated and ready to build the client,
/// the cache and the shell.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub per_page: u32,
    pub search_page_policy: SearchPagePolicy,
    pub cache: QueryCacheConfig,
    pub verbose: bool,
}

impl AppConfig {
    /// Resolves configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::from_parts(cli, std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Resolves configuration from CLI input and an explicit token value.
    ///
    /// A missing or blank token is not an error: requests then go out without
    /// credentials and the service answers them with 401.
    pub fn from_parts(cli: CommandLineInput, token: Option<String>) -> Result<Self, AppError> {
        let base_url = ValidatedUrl::parse(&cli.base_url)?;

        if !(1..=MAX_PER_PAGE).contains(&cli.per_page) {
            return Err(ValidationError::OutOfBounds {
                name: "per-page",
                value: cli.per_page,
                min: 1,
                max: MAX_PER_PAGE,
            }
            .into());
        }

        let token = match token.filter(|t| !t.trim().is_empty()) {
            Some(raw) => Some(ApiToken::new(raw)?),
            None => {
                log::warn!(
                    "{} is not set; requests will be sent without authorization",
                    TOKEN_ENV_VAR
                );
                None
            }
        };

        Ok(AppConfig {
            client: ClientConfig {
                token,
                ..ClientConfig::new(base_url)
            },
            per_page: cli.per_page,
            search_page_policy: if cli.reset_page_on_search {
                SearchPagePolicy::ResetToFirst
            } else {
                SearchPagePolicy::KeepPage
            },
            cache: QueryCacheConfig {
                stale_time: Duration::from_secs(cli.stale_secs),
                gc_time: Duration::from_secs(cli.gc_secs),
            },
            verbose: cli.verbose,
        })
    }

    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            per_page: self.per_page,
            search_window: SEARCH_DEBOUNCE_WINDOW,
            search_page_policy: self.search_page_policy,
        }
    }
}
