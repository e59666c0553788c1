//! Time-bounded snapshot cache with single-flight refresh.
//!
//! One slot holds the latest value and when its refresh started. A caller that
//! finds the slot fresh gets the stored value straight away. Otherwise it
//! either starts a refresh or, if one is already running, waits on that one:
//! concurrent callers never cause more than one upstream run.
//!
//! Slot lifecycle: `Empty -> Refreshing -> Fresh -> Stale -> Refreshing -> ...`
//!
//! The refresh runs on its own task and always runs to completion, even if
//! every caller waiting on it goes away. A successful refresh swaps the entry
//! in one step; a failed one leaves the previous entry untouched and every
//! waiter receives the same error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError<E> {
    #[error(transparent)]
    Refresh(E),

    /// The refresh task died (panicked) before reporting a result.
    #[error("cache refresh ended without a result")]
    RefreshAbandoned,
}

/// A stored value plus the moment its refresh started.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub captured_at: Instant,
    pub captured_at_utc: DateTime<Utc>,
    pub value: Arc<T>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            captured_at: self.captured_at,
            captured_at_utc: self.captured_at_utc,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> CacheEntry<T> {
    fn snapshot(&self, cached: bool) -> Snapshot<T> {
        Snapshot {
            value: Arc::clone(&self.value),
            captured_at: self.captured_at_utc,
            cached,
        }
    }
}

/// What a [`RefreshCache::get`] call hands back.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: Arc<T>,
    pub captured_at: DateTime<Utc>,
    /// True only when served from a fresh entry without starting or joining
    /// a refresh.
    pub cached: bool,
}

type Outcome<T, E> = Option<Result<CacheEntry<T>, E>>;

struct Slot<T, E> {
    entry: Option<CacheEntry<T>>,
    in_flight: Option<watch::Receiver<Outcome<T, E>>>,
    refreshes_started: u64,
}

pub struct RefreshCache<T, E> {
    slot: Arc<Mutex<Slot<T, E>>>,
}

impl<T, E> Default for RefreshCache<T, E> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                entry: None,
                in_flight: None,
                refreshes_started: 0,
            })),
        }
    }
}

impl<T, E> RefreshCache<T, E>
where
    T: Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value if it is younger than `ttl`; otherwise run
    /// `refresh` (or join the refresh already running) and return its result.
    pub async fn get<F, Fut>(&self, ttl: Duration, refresh: F) -> Result<Snapshot<T>, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut rx = {
            let mut slot = self.slot.lock().await;

            if let Some(entry) = &slot.entry {
                if entry.captured_at.elapsed() < ttl {
                    return Ok(entry.snapshot(true));
                }
            }

            // A closed channel means the refresh task died; start over.
            let joinable = slot
                .in_flight
                .as_ref()
                .filter(|rx| rx.has_changed().is_ok())
                .cloned();

            match joinable {
                Some(rx) => {
                    tracing::debug!("Joining in-flight cache refresh");
                    rx
                }
                None => self.start_refresh(&mut slot, refresh()),
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CacheError::RefreshAbandoned)?;

        match &*outcome {
            Some(Ok(entry)) => Ok(entry.snapshot(false)),
            Some(Err(e)) => Err(CacheError::Refresh(e.clone())),
            None => Err(CacheError::RefreshAbandoned),
        }
    }

    fn start_refresh<Fut>(
        &self,
        slot: &mut Slot<T, E>,
        refresh: Fut,
    ) -> watch::Receiver<Outcome<T, E>>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        slot.in_flight = Some(rx.clone());
        slot.refreshes_started += 1;

        let started = Instant::now();
        let started_utc = Utc::now();
        let shared = Arc::clone(&self.slot);
        tracing::debug!(refresh = slot.refreshes_started, "Starting cache refresh");

        tokio::spawn(async move {
            let result = refresh.await;

            let mut slot = shared.lock().await;
            let outcome = match result {
                Ok(value) => {
                    let entry = CacheEntry {
                        captured_at: started,
                        captured_at_utc: started_utc,
                        value: Arc::new(value),
                    };
                    // captured_at never moves backwards
                    let newer = slot
                        .entry
                        .as_ref()
                        .map_or(true, |current| current.captured_at <= started);
                    if newer {
                        slot.entry = Some(entry.clone());
                    }
                    Ok(entry)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        has_stale_entry = slot.entry.is_some(),
                        "Cache refresh failed, previous entry kept"
                    );
                    Err(e)
                }
            };
            slot.in_flight = None;
            // Err only when no one is waiting any more.
            let _ = tx.send(Some(outcome));
        });

        rx
    }

    /// Current entry, fresh or stale, without triggering a refresh.
    pub async fn peek(&self) -> Option<CacheEntry<T>> {
        self.slot.lock().await.entry.clone()
    }

    /// True while a refresh task is alive. A task that died without
    /// reporting does not count.
    pub async fn is_refreshing(&self) -> bool {
        self.slot
            .lock()
            .await
            .in_flight
            .as_ref()
            .is_some_and(|rx| rx.has_changed().is_ok())
    }

    /// Number of refreshes started since creation.
    pub async fn refreshes_started(&self) -> u64 {
        self.slot.lock().await.refreshes_started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::toilets::errors::UpstreamError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_millis(1000);

    type TestCache = RefreshCache<usize, UpstreamError>;

    /// Refresh that counts its runs and yields the run number.
    fn counting(
        runs: &Arc<AtomicUsize>,
        latency: Duration,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<usize, UpstreamError>> + Send>>
    {
        let runs = Arc::clone(runs);
        move || {
            Box::pin(async move {
                let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Ok(run)
            })
        }
    }

    fn failing(
        runs: &Arc<AtomicUsize>,
        latency: Duration,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<usize, UpstreamError>> + Send>>
    {
        let runs = Arc::clone(runs);
        move || {
            Box::pin(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Err(UpstreamError::Unavailable("connection refused".into()))
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_fresh_entry_until_ttl_expires() {
        let cache = TestCache::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let first = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert!(!first.cached);
        assert_eq!(*first.value, 1);

        tokio::time::advance(Duration::from_millis(500)).await;
        let second = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert!(second.cached);
        assert!(Arc::ptr_eq(&first.value, &second.value));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1000)).await;
        let third = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert!(!third.cached);
        assert_eq!(*third.value, 2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_refresh() {
        let cache = Arc::new(TestCache::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let refresh = counting(&runs, Duration::from_millis(200));
                tokio::spawn(async move { cache.get(TTL, refresh).await })
            })
            .collect();

        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.refreshes_started().await, 1);
        for snapshot in &snapshots {
            assert!(Arc::ptr_eq(&snapshot.value, &snapshots[0].value));
            assert!(!snapshot.cached);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_stale_entry() {
        let cache = TestCache::new();
        let runs = Arc::new(AtomicUsize::new(0));

        cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        let before = cache.peek().await.unwrap();

        tokio::time::advance(TTL).await;
        let err = cache
            .get(TTL, failing(&runs, Duration::ZERO))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::Refresh(UpstreamError::Unavailable("connection refused".into()))
        );

        let after = cache.peek().await.unwrap();
        assert!(Arc::ptr_eq(&before.value, &after.value));
        assert_eq!(before.captured_at, after.captured_at);
        assert!(!cache.is_refreshing().await);

        // The next call tries again.
        let retried = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert!(!retried.cached);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn every_waiter_sees_the_failure() {
        let cache = Arc::new(TestCache::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let refresh = failing(&runs, Duration::from_millis(200));
                tokio::spawn(async move { cache.get(TTL, refresh).await })
            })
            .collect();

        for handle in handles {
            assert!(matches!(
                handle.await.unwrap(),
                Err(CacheError::Refresh(UpstreamError::Unavailable(_)))
            ));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_completes_after_caller_gives_up() {
        let cache = TestCache::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let gave_up = tokio::time::timeout(
            Duration::from_millis(50),
            cache.get(TTL, counting(&runs, Duration::from_millis(200))),
        )
        .await;
        assert!(gave_up.is_err());
        assert!(cache.is_refreshing().await);

        tokio::time::sleep(Duration::from_millis(300)).await;

        let entry = cache.peek().await.unwrap();
        assert_eq!(*entry.value, 1);
        assert!(!cache.is_refreshing().await);
    }

    #[tokio::test(start_paused = true)]
    async fn captured_at_is_refresh_start_time() {
        let cache = TestCache::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let started = Instant::now();
        cache
            .get(TTL, counting(&runs, Duration::from_millis(300)))
            .await
            .unwrap();

        let entry = cache.peek().await.unwrap();
        assert_eq!(entry.captured_at, started);

        // Age counts from the start of the refresh, not its end.
        tokio::time::advance(Duration::from_millis(750)).await;
        let snapshot = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert!(!snapshot.cached);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn panicked_refresh_is_reported_and_retried() {
        let cache = TestCache::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let err = cache
            .get(TTL, || async {
                let value: Option<usize> = None;
                Ok(value.expect("refresh exploded"))
            })
            .await
            .unwrap_err();
        assert_eq!(err, CacheError::RefreshAbandoned);
        assert!(!cache.is_refreshing().await);
        assert!(cache.peek().await.is_none());

        let snapshot = cache.get(TTL, counting(&runs, Duration::ZERO)).await.unwrap();
        assert_eq!(*snapshot.value, 1);
        assert_eq!(cache.refreshes_started().await, 2);
    }
}
