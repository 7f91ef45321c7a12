//! Query cache and invalidation layer.
//!
//! Memoizes fetch results by [`QueryKey`], shares one request between every
//! concurrent caller of a key, and lets mutations mark whole key families
//! stale with [`QueryCache::invalidate`].

mod cache;
mod key;
mod state;

pub use cache::{CacheEvent, CacheEventKind, QueryCache, QueryCacheConfig, QueryObserver};
pub use key::{KeySegment, QueryKey};
pub use state::{FetchStatus, QueryError, QueryOutcome, QueryState, QueryStatus};
