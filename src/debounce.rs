// src/debounce.rs
//! Delayed propagation of rapidly changing input.
//!
//! [`DebounceTimer`] is the primitive: start, cancel, fire once. Starting it
//! again before it fires replaces the pending action. [`Debouncer`] builds on
//! it to hold a raw value that changes on every keystroke and a settled value
//! that only follows once the raw one has been still for the whole window.

use crate::constants::SEARCH_DEBOUNCE_WINDOW;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Duration;

/// Restartable one-shot timer backed by a Tokio task.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    pending: Option<AbortHandle>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` once after `window`, cancelling whatever was pending.
    pub fn start<F>(&mut self, window: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            action();
        });
        self.pending = Some(task.abort_handle());
    }

    /// Drops the pending action, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A raw value plus its debounced counterpart.
///
/// Only the last value pushed within a window ever reaches the settled side;
/// intermediate values are dropped, not queued.
pub struct Debouncer<T> {
    window: Duration,
    raw: T,
    timer: DebounceTimer,
    settled: Arc<watch::Sender<T>>,
}

impl Debouncer<String> {
    /// Search-box debouncer with the standard window.
    pub fn for_search() -> Self {
        Self::new(String::new(), SEARCH_DEBOUNCE_WINDOW)
    }
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, window: Duration) -> Self {
        let (settled, _) = watch::channel(initial.clone());
        Self {
            window,
            raw: initial,
            timer: DebounceTimer::new(),
            settled: Arc::new(settled),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a new raw value and restarts the quiet period.
    pub fn push(&mut self, value: T) {
        self.raw = value.clone();
        let settled = Arc::clone(&self.settled);
        self.timer.start(self.window, move || {
            publish(&settled, value);
        });
    }

    /// Settles the current raw value now. Returns whether the settled value changed.
    pub fn flush(&mut self) -> bool {
        self.timer.cancel();
        publish(&self.settled, self.raw.clone())
    }

    pub fn raw(&self) -> &T {
        &self.raw
    }

    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Receiver notified each time the settled value changes.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }
}

fn publish<T: PartialEq>(settled: &watch::Sender<T>, value: T) -> bool {
    settled.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn count_changes(debouncer: &Debouncer<String>) -> Arc<AtomicUsize> {
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        let mut rx = debouncer.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        changes
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_after_window() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        let f = Arc::clone(&fired);
        timer.start(Duration::from_millis(500), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_pending_action() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        for _ in 0..3 {
            let f = Arc::clone(&fired);
            timer.start(Duration::from_millis(500), move || {
                f.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        let f = Arc::clone(&fired);
        timer.start(Duration::from_millis(500), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.cancel());
        assert!(!timer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_settles_once_on_final_value() {
        let mut search = Debouncer::for_search();
        let changes = count_changes(&search);

        for text in ["m", "mi", "mil", "milk"] {
            search.push(text.to_string());
            tokio::time::sleep(Duration::from_millis(300)).await;
            assert_eq!(search.raw(), text);
        }
        assert_eq!(search.settled(), "");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(search.settled(), "milk");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_pause_produces_exactly_one_change() {
        let mut search = Debouncer::for_search();
        let changes = count_changes(&search);

        search.push("a".to_string());
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.push("ab".to_string());
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(search.settled(), "ab");
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn returning_to_settled_value_emits_nothing() {
        let mut search = Debouncer::new("milk".to_string(), Duration::from_millis(500));
        let changes = count_changes(&search);

        search.push("mil".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.push("milk".to_string());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_settles_immediately() {
        let mut search = Debouncer::for_search();
        search.push("urgent".to_string());
        assert!(search.is_pending());

        assert!(search.flush());
        assert!(!search.is_pending());
        assert_eq!(search.settled(), "urgent");
        assert!(!search.flush());
    }
}
