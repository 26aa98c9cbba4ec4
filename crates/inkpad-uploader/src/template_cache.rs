//! Memoizing cache for named template fragments.
//!
//! The first `fetch` for a name goes to the [`TemplateSource`]; the content
//! is memoized on success and every later call is served from memory through
//! the same async contract. Concurrent callers for one uncached name share a
//! single in-flight source call: the first caller fetches, the rest wait on
//! oneshot channels and receive the same result. Failures are delivered to
//! every waiter with the variant the source produced, and never cached, so
//! the next call retries. If the initiating call is dropped mid-fetch the
//! in-flight slot is cleared and its waiters fail, so later calls retry
//! instead of waiting forever.
//!
//! The cache is unbounded and lives for the page session; there is no
//! eviction. The slot map lock is a plain mutex and is never held across an
//! await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use inkpad_core::{AppError, TemplateSource};

enum Slot {
    Ready(String),
    InFlight(Vec<oneshot::Sender<Result<String, AppError>>>),
}

pub struct TemplateCache {
    source: Arc<dyn TemplateSource>,
    slots: Mutex<HashMap<String, Slot>>,
}

/// Clears the in-flight slot when the initiating fetch is dropped before it
/// published a result, failing any waiters so they do not hang.
struct InFlightGuard<'a> {
    cache: &'a TemplateCache,
    name: &'a str,
    published: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        let mut slots = self.cache.slots.lock().expect("template slots poisoned");
        if let Some(Slot::InFlight(waiters)) = slots.remove(self.name) {
            tracing::warn!(template = self.name, "Template fetch dropped mid-flight");
            for tx in waiters {
                let _ = tx.send(Err(AppError::Internal(
                    "Template fetch was dropped".to_string(),
                )));
            }
        }
    }
}

impl TemplateCache {
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the template content for `name`, fetching it through the
    /// source on first use and from memory afterwards.
    pub async fn fetch(&self, name: &str) -> Result<String, AppError> {
        let waiter = {
            let mut slots = self.slots.lock().expect("template slots poisoned");
            match slots.get_mut(name) {
                Some(Slot::Ready(content)) => {
                    tracing::debug!(template = name, "Template cache hit");
                    return Ok(content.clone());
                }
                Some(Slot::InFlight(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    slots.insert(name.to_string(), Slot::InFlight(Vec::new()));
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            tracing::debug!(template = name, "Joining in-flight template fetch");
            return rx
                .await
                .map_err(|_| AppError::Internal("Template fetch was dropped".to_string()))?;
        }

        let mut guard = InFlightGuard {
            cache: self,
            name,
            published: false,
        };
        let result = self.source.fetch_template(name).await;

        let waiters = {
            let mut slots = self.slots.lock().expect("template slots poisoned");
            let waiters = match slots.remove(name) {
                Some(Slot::InFlight(waiters)) => waiters,
                _ => Vec::new(),
            };
            if let Ok(content) = &result {
                slots.insert(name.to_string(), Slot::Ready(content.clone()));
            }
            waiters
        };
        guard.published = true;

        for tx in waiters {
            let shared = match &result {
                Ok(content) => Ok(content.clone()),
                Err(e) => Err(e.share()),
            };
            let _ = tx.send(shared);
        }

        if let Err(e) = &result {
            tracing::warn!(template = name, error = %e, "Template fetch failed");
        }

        result
    }

    /// Number of memoized templates.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().expect("template slots poisoned");
        slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TemplateSource for CountingSource {
        async fn fetch_template(&self, name: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::TemplateFetch("boom".to_string()))
            } else {
                Ok(format!("<div>{}</div>", name))
            }
        }
    }

    /// Blocks until notified, then fails with an HTTP error.
    struct GatedHttpFailSource {
        gate: Notify,
    }

    #[async_trait]
    impl TemplateSource for GatedHttpFailSource {
        async fn fetch_template(&self, _name: &str) -> Result<String, AppError> {
            self.gate.notified().await;
            Err(AppError::Http("bad gateway".to_string()))
        }
    }

    /// First call never resolves; later calls succeed.
    struct StallThenServeSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TemplateSource for StallThenServeSource {
        async fn fetch_template(&self, name: &str) -> Result<String, AppError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return std::future::pending().await;
            }
            Ok(format!("<div>{}</div>", name))
        }
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_memory() {
        let source = CountingSource::new(false);
        let cache = TemplateCache::new(source.clone());

        let first = cache.fetch("page/attachments.html").await.unwrap();
        let second = cache.fetch("page/attachments.html").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn distinct_names_fetch_separately() {
        let source = CountingSource::new(false);
        let cache = TemplateCache::new(source.clone());

        cache.fetch("a.html").await.unwrap();
        cache.fetch("b.html").await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = CountingSource::new(true);
        let cache = TemplateCache::new(source.clone());

        assert!(cache.fetch("a.html").await.is_err());
        assert!(cache.fetch("a.html").await.is_err());

        // both calls reached the source since the failure was not memoized
        assert_eq!(source.calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_source_call() {
        let source = CountingSource::new(false);
        let cache = Arc::new(TemplateCache::new(source.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(
                async move { cache.fetch("shared.html").await },
            ));
        }

        for handle in handles {
            let content = handle.await.unwrap().unwrap();
            assert_eq!(content, "<div>shared.html</div>");
        }

        assert_eq!(source.calls(), 1);
    }

    // runs on the current-thread runtime, so yield_now sequences the tasks
    #[tokio::test]
    async fn waiters_receive_the_sources_error_variant() {
        let source = Arc::new(GatedHttpFailSource {
            gate: Notify::new(),
        });
        let cache = Arc::new(TemplateCache::new(source.clone()));

        let leader = tokio::spawn({
            let cache = cache.clone();
            async move { cache.fetch("x.html").await }
        });
        tokio::task::yield_now().await;
        let waiter = tokio::spawn({
            let cache = cache.clone();
            async move { cache.fetch("x.html").await }
        });
        tokio::task::yield_now().await;
        source.gate.notify_waiters();

        let leader_err = leader.await.unwrap().unwrap_err();
        let waiter_err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(&leader_err, AppError::Http(msg) if msg == "bad gateway"));
        assert!(matches!(&waiter_err, AppError::Http(msg) if msg == "bad gateway"));
    }

    #[tokio::test]
    async fn dropped_initiating_fetch_clears_the_slot() {
        let source = Arc::new(StallThenServeSource {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(TemplateCache::new(source.clone()));

        let leader = tokio::spawn({
            let cache = cache.clone();
            async move { cache.fetch("x.html").await }
        });
        tokio::task::yield_now().await;
        let waiter = tokio::spawn({
            let cache = cache.clone();
            async move { cache.fetch("x.html").await }
        });
        tokio::task::yield_now().await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        // the waiter fails instead of hanging
        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // the slot was cleared, so a later call reaches the source again
        let content = cache.fetch("x.html").await.unwrap();
        assert_eq!(content, "<div>x.html</div>");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
