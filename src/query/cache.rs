// src/query/cache.rs
//! Keyed cache of fetch results with request de-duplication and
//! prefix invalidation.
//!
//! Each [`QueryKey`] owns one entry holding its latest [`QueryState`], the
//! function that fetches it and at most one in-flight request. Callers asking
//! for a key while its request is on the wire join that request instead of
//! starting another. Results are written only to the entry of the key that
//! requested them, so a late response for an old key never touches the state
//! of the key currently on screen.
//!
//! Mutations never patch entries. They call [`QueryCache::invalidate`] and the
//! affected keys are fetched again from the server.

use super::key::QueryKey;
use super::state::{QueryOutcome, QueryState, QueryStatus};
use crate::constants::DEFAULT_GC_TIME;
use crate::error::AppError;
use crate::notify::{Listeners, Subscription};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, AppError>> + Send + Sync>;
type InFlight<T> = Shared<BoxFuture<'static, QueryOutcome<T>>>;

/// Freshness and retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCacheConfig {
    /// Age after which a successful result is refreshed on the next request.
    /// Zero means every new request refreshes in the background.
    pub stale_time: Duration,
    /// How long an entry without observers is kept for quick revisits.
    pub gc_time: Duration,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

/// What happened to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    Fetching,
    Succeeded,
    Failed,
    Invalidated,
    /// A result arrived for a request made before the latest invalidation
    /// and was thrown away.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

impl CacheEvent {
    fn new(key: &QueryKey, kind: CacheEventKind) -> Self {
        Self {
            key: key.clone(),
            kind,
        }
    }
}

struct Entry<T> {
    state: QueryState<T>,
    fetcher: Fetcher<T>,
    in_flight: Option<InFlight<T>>,
    // Bumped by invalidation; a settling request from an older generation is stale.
    generation: u64,
    observers: usize,
    inactive_since: Option<Instant>,
}

impl<T> Entry<T> {
    fn new(fetcher: Fetcher<T>) -> Self {
        Self {
            state: QueryState::pending(),
            fetcher,
            in_flight: None,
            generation: 0,
            observers: 0,
            inactive_since: Some(Instant::now()),
        }
    }

    fn should_fetch(&self, stale_time: Duration) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match self.state.status {
            QueryStatus::Pending | QueryStatus::Error => true,
            QueryStatus::Success => self.state.is_stale(stale_time),
        }
    }
}

struct CacheCore<T> {
    entries: Mutex<HashMap<QueryKey, Entry<T>>>,
    listeners: Listeners<CacheEvent>,
    config: QueryCacheConfig,
}

/// Shared query cache. Cloning yields another handle to the same entries.
///
/// Every method that may start a request must run inside a Tokio runtime:
/// requests are driven by spawned tasks so they complete even when nobody
/// awaits them.
pub struct QueryCache<T> {
    core: Arc<CacheCore<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> Default for QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}

impl<T> QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            core: Arc::new(CacheCore {
                entries: Mutex::new(HashMap::new()),
                listeners: Listeners::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> QueryCacheConfig {
        self.core.config
    }

    /// Returns the current state of `key` and starts a request when the entry
    /// is new, failed, invalidated or stale and nothing is in flight.
    pub fn query<F, Fut>(&self, key: QueryKey, fetch: F) -> QueryState<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        self.register(&key, into_fetcher(fetch), false)
    }

    /// Like [`query`](Self::query), and keeps `key` observed until the
    /// returned observer is dropped. Invalidation re-fetches observed keys
    /// immediately; unobserved ones wait for their next request.
    pub fn observe<F, Fut>(&self, key: QueryKey, fetch: F) -> QueryObserver<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        self.register(&key, into_fetcher(fetch), true);
        QueryObserver {
            key,
            cache: self.clone(),
        }
    }

    /// Resolves `key`, joining the in-flight request if there is one and
    /// returning fresh cached data without a request otherwise.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> QueryOutcome<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let fetcher = into_fetcher(fetch);
        let (flight, events) = {
            let mut entries = self.core.entries.lock();
            self.core.sweep(&mut entries);
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(Arc::clone(&fetcher)));
            entry.fetcher = fetcher;

            if let Some(flight) = &entry.in_flight {
                log::debug!("Joining in-flight request for {}", key);
                (flight.clone(), Vec::new())
            } else if entry.state.is_success()
                && !entry.state.is_stale(self.core.config.stale_time)
            {
                if let Some(data) = &entry.state.data {
                    log::debug!("Cache hit: {}", key);
                    return Ok(data.clone());
                }
                let (flight, event) = start_fetch(&self.core, &key, entry);
                (flight, vec![event])
            } else {
                let (flight, event) = start_fetch(&self.core, &key, entry);
                (flight, vec![event])
            }
        };
        self.core.emit_all(&events);
        flight.await
    }

    /// Marks every entry whose key starts with `prefix` as stale and re-fetches
    /// the observed ones. Returns how many entries matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let events = {
            let mut entries = self.core.entries.lock();
            let mut events = Vec::new();
            for (key, entry) in entries.iter_mut() {
                if !key.starts_with(prefix) {
                    continue;
                }
                entry.state.is_invalidated = true;
                entry.generation += 1;
                events.push(CacheEvent::new(key, CacheEventKind::Invalidated));

                // An observed key with a request already on the wire is
                // re-fetched when that request settles.
                if entry.observers > 0 && entry.in_flight.is_none() {
                    let (_, event) = start_fetch(&self.core, key, entry);
                    events.push(event);
                }
            }
            events
        };

        let matched = events
            .iter()
            .filter(|e| e.kind == CacheEventKind::Invalidated)
            .count();
        log::debug!("Invalidated {} queries under {}", matched, prefix);
        self.core.emit_all(&events);
        matched
    }

    /// Starts a request for an existing entry unless one is in flight.
    pub fn refetch(&self, key: &QueryKey) -> bool {
        let event = {
            let mut entries = self.core.entries.lock();
            match entries.get_mut(key) {
                Some(entry) if entry.in_flight.is_none() => {
                    Some(start_fetch(&self.core, key, entry).1)
                }
                _ => None,
            }
        };
        match event {
            Some(event) => {
                self.core.listeners.emit(&event);
                true
            }
            None => false,
        }
    }

    /// Current state of `key`, if the cache holds an entry for it.
    pub fn state(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.core
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.state.clone())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.core
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.core
            .entries
            .lock()
            .get(key)
            .map_or(0, |entry| entry.observers)
    }

    pub fn len(&self) -> usize {
        self.core.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `callback` after every entry transition.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.core.listeners.subscribe(callback)
    }

    fn register(&self, key: &QueryKey, fetcher: Fetcher<T>, observe: bool) -> QueryState<T> {
        let (snapshot, events) = {
            let mut entries = self.core.entries.lock();
            self.core.sweep(&mut entries);
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(Arc::clone(&fetcher)));
            entry.fetcher = fetcher;

            if observe {
                entry.observers += 1;
                entry.inactive_since = None;
            }

            let mut events = Vec::new();
            if entry.should_fetch(self.core.config.stale_time) {
                let (_, event) = start_fetch(&self.core, key, entry);
                events.push(event);
            } else {
                log::debug!("Cache hit: {}", key);
            }
            (entry.state.clone(), events)
        };
        self.core.emit_all(&events);
        snapshot
    }
}

impl<T> CacheCore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Writes a finished request into its entry.
    fn settle(core: &Arc<Self>, key: &QueryKey, generation: u64, outcome: &QueryOutcome<T>) {
        let events = {
            let mut entries = core.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            entry.in_flight = None;

            if entry.generation != generation {
                log::debug!("Discarding result for {} fetched before invalidation", key);
                let mut events = vec![CacheEvent::new(key, CacheEventKind::Discarded)];
                if entry.observers > 0 {
                    let (_, event) = start_fetch(core, key, entry);
                    events.push(event);
                } else {
                    entry.state.abandon_fetch();
                }
                events
            } else {
                match outcome {
                    Ok(data) => {
                        entry.state.resolve(data.clone());
                        vec![CacheEvent::new(key, CacheEventKind::Succeeded)]
                    }
                    Err(error) => {
                        log::warn!("Query {} failed: {}", key, error);
                        entry.state.reject(Arc::clone(error));
                        vec![CacheEvent::new(key, CacheEventKind::Failed)]
                    }
                }
            }
        };
        core.emit_all(&events);
    }

    /// Drops entries nobody has observed for longer than `gc_time`.
    fn sweep(&self, entries: &mut HashMap<QueryKey, Entry<T>>) {
        let gc_time = self.config.gc_time;
        entries.retain(|key, entry| {
            let keep = entry.observers > 0
                || entry.in_flight.is_some()
                || entry
                    .inactive_since
                    .map_or(true, |since| since.elapsed() < gc_time);
            if !keep {
                log::debug!("Evicting inactive query {}", key);
            }
            keep
        });
    }

    fn emit_all(&self, events: &[CacheEvent]) {
        for event in events {
            self.listeners.emit(event);
        }
    }
}

/// Starts the entry's fetcher and records the request as in flight.
///
/// The request is spawned so it settles even if every caller goes away.
/// Whoever polls it first writes the result into the cache, before any
/// awaiting caller sees it.
fn start_fetch<T>(
    core: &Arc<CacheCore<T>>,
    key: &QueryKey,
    entry: &mut Entry<T>,
) -> (InFlight<T>, CacheEvent)
where
    T: Clone + Send + Sync + 'static,
{
    let generation = entry.generation;
    let request = (entry.fetcher)();
    let weak = Arc::downgrade(core);
    let settle_key = key.clone();

    let flight: InFlight<T> = async move {
        let outcome: QueryOutcome<T> = request.await.map_err(Arc::new);
        if let Some(core) = weak.upgrade() {
            CacheCore::settle(&core, &settle_key, generation, &outcome);
        }
        outcome
    }
    .boxed()
    .shared();

    entry.in_flight = Some(flight.clone());
    entry.state.begin_fetch();
    tokio::spawn(flight.clone().map(|_| ()));

    log::debug!("Cache miss: fetching {}", key);
    (flight, CacheEvent::new(key, CacheEventKind::Fetching))
}

fn into_fetcher<T, F, Fut>(fetch: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    Arc::new(move || fetch().boxed())
}

/// Keeps a key observed for as long as it lives.
///
/// The shell holds exactly one observer: the key currently on screen.
pub struct QueryObserver<T> {
    key: QueryKey,
    cache: QueryCache<T>,
}

impl<T> QueryObserver<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state of the observed key.
    pub fn state(&self) -> QueryState<T> {
        self.cache.state(&self.key).unwrap_or_default()
    }

    pub fn refetch(&self) -> bool {
        self.cache.refetch(&self.key)
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        let mut entries = self.cache.core.entries.lock();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 {
                entry.inactive_since = Some(Instant::now());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, Notify};

    fn counting_fetcher(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, Result<usize, AppError>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(n)
            }
            .boxed()
        }
    }

    fn event_channel(cache: &QueryCache<usize>) -> (Subscription, mpsc::UnboundedReceiver<CacheEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = cache.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (sub, rx)
    }

    async fn wait_for(rx: &mut mpsc::UnboundedReceiver<CacheEvent>, key: &QueryKey, kind: CacheEventKind) {
        while let Some(event) = rx.recv().await {
            if &event.key == key && event.kind == kind {
                return;
            }
        }
        panic!("event stream closed before {:?} for {}", kind, key);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::notes(1, "");

        let results = futures::future::join_all(
            (0..8).map(|_| cache.fetch(key.clone(), counting_fetcher(&calls))),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| matches!(r, Ok(1))));
        assert!(cache.state(&key).unwrap().is_success());
    }

    #[tokio::test]
    async fn query_reports_pending_then_success() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::notes(1, "");

        let first = cache.query(key.clone(), counting_fetcher(&calls));
        assert!(first.is_loading());

        // Joins the request started above.
        let second = cache.query(key.clone(), counting_fetcher(&calls));
        assert!(second.is_loading());

        assert_eq!(cache.fetch(key.clone(), counting_fetcher(&calls)).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&key).unwrap().data, Some(1));
    }

    #[tokio::test]
    async fn fresh_data_is_served_without_a_request() {
        let cache = QueryCache::<usize>::new(QueryCacheConfig {
            stale_time: Duration::from_secs(60),
            ..QueryCacheConfig::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::notes(1, "");

        cache.fetch(key.clone(), counting_fetcher(&calls)).await.unwrap();
        let state = cache.query(key.clone(), counting_fetcher(&calls));

        assert!(state.is_success());
        assert!(!state.is_fetching());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_stay_with_their_key() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let bad = QueryKey::notes(1, "bad");
        let good = QueryKey::notes(1, "good");

        let err = cache
            .fetch(bad.clone(), || async {
                Err(AppError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "boom".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert_eq!(err.display_message(), "boom");

        cache.fetch(good.clone(), counting_fetcher(&calls)).await.unwrap();

        assert!(cache.state(&bad).unwrap().is_error());
        assert!(cache.state(&good).unwrap().is_success());
    }

    #[tokio::test]
    async fn failed_key_is_retried_only_when_requested_again() {
        let cache = QueryCache::<usize>::default();
        let attempts = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::notes(1, "");

        let failing = {
            let attempts = Arc::clone(&attempts);
            move || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<usize, _>(AppError::MalformedResponse("bad json".to_string()))
                }
            }
        };

        let _ = cache.fetch(key.clone(), failing.clone()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        let _ = cache.fetch(key.clone(), failing).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_refetches_only_observed_keys_under_prefix() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let (_sub, mut rx) = event_channel(&cache);

        let watched = QueryKey::notes(1, "");
        let unwatched = QueryKey::notes(2, "");
        let other = QueryKey::resource("tags");

        let observer = cache.observe(watched.clone(), counting_fetcher(&calls));
        wait_for(&mut rx, &watched, CacheEventKind::Succeeded).await;
        cache.fetch(unwatched.clone(), counting_fetcher(&calls)).await.unwrap();
        cache.fetch(other.clone(), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert_eq!(cache.invalidate(&QueryKey::all_notes()), 2);
        wait_for(&mut rx, &watched, CacheEventKind::Succeeded).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(observer.state().data, Some(4));
        assert!(cache.state(&unwatched).unwrap().is_invalidated);
        assert!(!cache.state(&other).unwrap().is_invalidated);
    }

    #[tokio::test]
    async fn result_fetched_before_invalidation_is_discarded() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let (_sub, mut rx) = event_channel(&cache);
        let key = QueryKey::notes(1, "");

        let fetcher = {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let gate = Arc::clone(&gate);
                async move {
                    if n == 1 {
                        gate.notified().await;
                    }
                    Ok(n)
                }
            }
        };

        let observer = cache.observe(key.clone(), fetcher);
        cache.invalidate(&QueryKey::all_notes());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no second request while one is in flight");

        gate.notify_one();
        wait_for(&mut rx, &key, CacheEventKind::Discarded).await;
        wait_for(&mut rx, &key, CacheEventKind::Succeeded).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(observer.state().data, Some(2));
        assert!(!observer.state().is_invalidated);
    }

    #[tokio::test]
    async fn dropping_observer_releases_the_key() {
        let cache = QueryCache::<usize>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::notes(1, "");

        let a = cache.observe(key.clone(), counting_fetcher(&calls));
        let b = cache.observe(key.clone(), counting_fetcher(&calls));
        assert_eq!(cache.observer_count(&key), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(a);
        assert_eq!(cache.observer_count(&key), 1);
        drop(b);
        assert_eq!(cache.observer_count(&key), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_entries_are_evicted_after_gc_time() {
        let cache = QueryCache::<usize>::new(QueryCacheConfig {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(1),
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let old = QueryKey::notes(1, "");
        let kept = QueryKey::notes(2, "");

        cache.fetch(old.clone(), counting_fetcher(&calls)).await.unwrap();
        let _observer = cache.observe(kept.clone(), counting_fetcher(&calls));

        tokio::time::sleep(Duration::from_secs(2)).await;
        cache.query(QueryKey::notes(3, ""), counting_fetcher(&calls));

        assert!(cache.state(&old).is_none());
        assert!(cache.state(&kept).is_some());
    }
}
