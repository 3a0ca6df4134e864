use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use taskboard_client::TaskGateway;
use taskboard_core::{RemoteError, Task};
use taskboard_store::TaskStore;

/// Cache key for the full task list.
pub const TASKS_KEY: &str = "tasks";

pub type FetchResult = Result<Arc<Vec<Task>>, RemoteError>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Keyed, coalescing loader for the task list.
///
/// While a fetch for a key is in flight, further `fetch` calls for that key
/// join it instead of issuing another request, and every waiter observes the
/// same outcome. A successful fetch is written to the store once, by the
/// underlying request rather than by each waiter. Every key is served by
/// [`TaskGateway::list`]; the key only scopes coalescing.
pub struct FetchCoordinator {
    gateway: Arc<dyn TaskGateway>,
    store: TaskStore,
    in_flight: DashMap<String, SharedFetch>,
}

impl FetchCoordinator {
    pub fn new(gateway: Arc<dyn TaskGateway>, store: TaskStore) -> Self {
        Self {
            gateway,
            store,
            in_flight: DashMap::new(),
        }
    }

    /// Load `key`, joining a request that is already running for it.
    pub async fn fetch(&self, key: &str) -> FetchResult {
        let shared = self.join_or_start(key);
        let result = shared.clone().await;
        self.retire(key, &shared);
        result
    }

    /// Wait for any in-flight fetch of `key` to settle, then fetch again.
    /// The fresh request can itself be joined by later callers.
    pub async fn revalidate(&self, key: &str) -> FetchResult {
        let pending = self.in_flight.get(key).map(|entry| entry.value().clone());
        if let Some(pending) = pending {
            debug!(key, "revalidate waiting on in-flight fetch");
            let _ = pending.clone().await;
            self.retire(key, &pending);
        }
        self.fetch(key).await
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .get(key)
            .is_some_and(|entry| entry.value().peek().is_none())
    }

    fn join_or_start(&self, key: &str) -> SharedFetch {
        let mut started = false;
        let mut slot = self.in_flight.entry(key.to_owned()).or_insert_with(|| {
            started = true;
            self.start(key)
        });
        // A settled entry is left behind when its last waiter was dropped
        // before it could retire it.
        if slot.peek().is_some() {
            started = true;
            *slot = self.start(key);
        }
        if !started {
            debug!(key, "joining in-flight fetch");
        }
        slot.value().clone()
    }

    fn retire(&self, key: &str, finished: &SharedFetch) {
        self.in_flight
            .remove_if(key, |_, current| current.ptr_eq(finished));
    }

    fn start(&self, key: &str) -> SharedFetch {
        let gateway = Arc::clone(&self.gateway);
        let store = self.store.clone();
        let key = key.to_owned();
        debug!(key = %key, "starting fetch");
        async move {
            let started = Instant::now();
            match gateway.list().await {
                Ok(tasks) => {
                    debug!(
                        key = %key,
                        count = tasks.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "fetch completed"
                    );
                    store.replace_all(tasks.clone());
                    Ok(Arc::new(tasks))
                }
                Err(e) => {
                    warn!(key = %key, error = %e, kind = e.error_kind(), "fetch failed");
                    Err(e)
                }
            }
        }
        .boxed()
        .shared()
    }
}
