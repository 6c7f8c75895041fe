//! Fetch coordination: at most one background fetch per identifier.
//!
//! `Fetcher` owns the in-flight map. Admission, cancellation and clearing
//! mutate it under a mutex that is never held across I/O; each admitted
//! identifier gets its own tokio task that retrieves the resource, checks
//! cancellation, and on a 2xx response writes the body to the cache store
//! under the normalized key. The task removes its own entry when it ends,
//! however it ends.
//!
//! Errors never reach the caller: a failed fetch is simply "not cached yet"
//! and the next cache miss will ask again.

mod guard;
mod run;


use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::Instrument;

use crate::cancel::CancelToken;
use crate::store::{self, CacheStore, StoreError};
use crate::transport::Transport;

use guard::InFlightGuard;

/// Scheduling hint for a fetch. Tokio has no task priorities, so this is
/// advisory: it is recorded on the in-flight entry and the task's span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    #[error("fetcher must be created inside a tokio runtime")]
    NoRuntime,
    /// The namespace could never be written or cleared.
    #[error(transparent)]
    Namespace(#[from] StoreError),
}

/// Bookkeeping for one admitted identifier.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancelToken,
    priority: Priority,
}

struct Inner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CacheStore>,
    namespace: String,
    runtime: Handle,
    in_flight: Mutex<HashMap<String, InFlight>>,
    next_generation: AtomicU64,
    /// Background tasks still running, cancelled ones included.
    running: watch::Sender<usize>,
}

impl Inner {
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the fetch coordinator. Cloning is cheap and every clone
/// shares the same in-flight map; build one in the composition root and
/// pass it to whatever needs it.
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<Inner>,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("namespace", &self.inner.namespace)
            .field("in_flight", &self.in_flight_len())
            .field("running", &self.running())
            .finish()
    }
}

impl Fetcher {
    /// Create a fetcher writing into `namespace` of `store`. Must be called
    /// from within a tokio runtime; background tasks are spawned on it.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
        namespace: impl Into<String>,
    ) -> Result<Self, FetcherError> {
        let runtime = Handle::try_current().map_err(|_| FetcherError::NoRuntime)?;
        Self::with_runtime(runtime, transport, store, namespace)
    }

    /// Like [`Fetcher::new`] with an explicit runtime handle. Fails if
    /// `namespace` is not a single path component.
    pub fn with_runtime(
        runtime: Handle,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CacheStore>,
        namespace: impl Into<String>,
    ) -> Result<Self, FetcherError> {
        let namespace = namespace.into();
        store::check_namespace(&namespace)?;
        let (running, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                store,
                namespace,
                runtime,
                in_flight: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                running,
            }),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Fetch `identifier` in the background at [`Priority::Normal`].
    pub fn fetch(&self, identifier: &str) {
        self.fetch_with_priority(identifier, Priority::Normal);
    }

    /// Fetch `identifier` in the background unless it is already in flight,
    /// in which case this is a no-op. Returns immediately; failures are
    /// logged and otherwise dropped.
    pub fn fetch_with_priority(&self, identifier: &str, priority: Priority) {
        let (generation, token) = {
            let mut in_flight = self.inner.lock_in_flight();
            if in_flight.contains_key(identifier) {
                tracing::trace!(identifier, "already in flight");
                return;
            }
            let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
            let token = CancelToken::new();
            in_flight.insert(
                identifier.to_string(),
                InFlight {
                    generation,
                    token: token.clone(),
                    priority,
                },
            );
            (generation, token)
        };
        self.inner.running.send_modify(|n| *n += 1);

        // Created before spawning so the entry is released even if the
        // runtime drops the task without polling it.
        let guard = InFlightGuard::new(Arc::clone(&self.inner), identifier.to_string(), generation);
        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        let span = tracing::debug_span!("fetch", %identifier, %priority, generation);

        self.inner.runtime.spawn(
            async move {
                let _guard = guard;
                let outcome = run::run_fetch(&inner, &identifier, &token).await;
                tracing::debug!(%outcome, "fetch finished");
            }
            .instrument(span),
        );
    }

    /// Cancel a pending fetch. The entry is removed before this returns; the
    /// task itself stops at its next cancellation check and never writes.
    pub fn cancel_prefetch(&self, identifier: &str) {
        let removed = self.inner.lock_in_flight().remove(identifier);
        if let Some(entry) = removed {
            entry.token.cancel();
            tracing::debug!(identifier, generation = entry.generation, "prefetch cancelled");
        }
    }

    /// Cancel every in-flight fetch, then erase the cache namespace.
    /// Store errors are logged and swallowed.
    pub async fn clear_cache(&self) {
        let drained: Vec<(String, InFlight)> = self.inner.lock_in_flight().drain().collect();
        for (identifier, entry) in &drained {
            entry.token.cancel();
            tracing::trace!(identifier = %identifier, priority = %entry.priority, "cancelled by clear");
        }

        let store = Arc::clone(&self.inner.store);
        let namespace = self.inner.namespace.clone();
        match tokio::task::spawn_blocking(move || store.clear(&namespace)).await {
            Ok(Ok(())) => tracing::info!(
                namespace = %self.inner.namespace,
                cancelled = drained.len(),
                "cache cleared"
            ),
            Ok(Err(e)) => tracing::warn!(namespace = %self.inner.namespace, "cache clear failed: {}", e),
            Err(e) => tracing::warn!("cache clear task failed: {}", e),
        }
    }

    pub fn is_in_flight(&self, identifier: &str) -> bool {
        self.inner.lock_in_flight().contains_key(identifier)
    }

    /// Number of identifiers currently admitted.
    pub fn in_flight_len(&self) -> usize {
        self.inner.lock_in_flight().len()
    }

    /// Priority an in-flight identifier was admitted with.
    pub fn priority_of(&self, identifier: &str) -> Option<Priority> {
        self.inner.lock_in_flight().get(identifier).map(|e| e.priority)
    }

    /// Number of background tasks still running. Cancelled tasks count until
    /// they actually stop, so this can exceed [`Fetcher::in_flight_len`].
    pub fn running(&self) -> usize {
        *self.inner.running.borrow()
    }

    /// Wait until every background task has stopped, cancelled ones included.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.running.subscribe();
        let _ = rx.wait_for(|running| *running == 0).await;
    }
}
