use super::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Entries are dropped unconditionally this long after insertion.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A pending-or-resolved request outcome, awaitable by any number of callers.
pub type SharedOutcome = Shared<BoxFuture<'static, Result<String, ApiError>>>;

/// Dedup/TTL cache over raw response bodies, keyed by endpoint plus the
/// canonical serialization of the request body.
///
/// Purely an optimization: identical input is assumed to resolve to the same
/// response, so a miss simply re-fetches. Two callers hitting the same key
/// while the first request is still pending await one shared future, and the
/// transport is polled once.
#[derive(Clone)]
pub struct RequestCache {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    next_generation: u64,
}

#[derive(Clone)]
struct Entry {
    generation: u64,
    outcome: SharedOutcome,
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

impl RequestCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
        }
    }

    pub fn key(endpoint: &str, body: Option<&serde_json::Value>) -> String {
        match body {
            // serde_json::Map keeps a deterministic key order, so identical
            // payloads always produce identical keys.
            Some(body) => format!("{endpoint}:{body}"),
            None => endpoint.to_string(),
        }
    }

    /// Look up a pending or resolved outcome. Resolved failures are dropped
    /// here rather than returned: only successes are deterministic for
    /// identical input, and a served stale error would defeat a retry. This
    /// holds no matter which caller (if any) survived to see the failure.
    pub fn get(&self, endpoint: &str, body: Option<&serde_json::Value>) -> Option<SharedOutcome> {
        let key = Self::key(endpoint, body);
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let failed = matches!(
            inner.entries.get(&key).map(|e| e.outcome.peek()),
            Some(Some(Err(_)))
        );
        if failed {
            inner.entries.remove(&key);
            return None;
        }
        inner.entries.get(&key).map(|e| e.outcome.clone())
    }

    /// Store an outcome and return it for chaining. Spawns the eviction timer;
    /// the timer only removes the entry it belongs to, so replacing a key does
    /// not let the old timer evict the replacement.
    pub fn set(
        &self,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        outcome: BoxFuture<'static, Result<String, ApiError>>,
    ) -> SharedOutcome {
        let key = Self::key(endpoint, body);
        let shared = outcome.shared();

        let generation = {
            let mut inner = self.inner.lock().expect("cache lock poisoned");
            let generation = inner.next_generation;
            inner.next_generation += 1;
            inner.entries.insert(
                key.clone(),
                Entry {
                    generation,
                    outcome: shared.clone(),
                },
            );
            generation
        };

        let weak = Arc::downgrade(&self.inner);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().expect("cache lock poisoned");
                if inner.entries.get(&key).is_some_and(|e| e.generation == generation) {
                    inner.entries.remove(&key);
                    tracing::trace!(%key, "cache entry expired");
                }
            }
        });

        shared
    }

    pub fn clear(&self) {
        self.inner.lock().expect("cache lock poisoned").entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").entries.len()
    }
}
