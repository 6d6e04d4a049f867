//! Keyed read cache with in-flight sharing and mutation-driven invalidation.
//!
//! Reads go through [`SyncContext::read`]: a fresh cached value is returned
//! as-is, otherwise one fetch per key runs on the runtime and every
//! concurrent reader of that key awaits the same result. Writes go through
//! [`SyncContext::mutate`], which marks the keys a write makes stale before
//! reporting success and broadcasts them to live subscribers.
//!
//! Each key carries a generation counter. Invalidation bumps it and detaches
//! any in-flight fetch, whose result is then handed to its waiters but never
//! stored.

mod key;
mod state;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

pub use key::{CacheValue, QueryKey, QueryValue};
pub use state::{QueryState, SyncError};

use crate::backend::{BackendError, BackendHandle};
use crate::connection::ConnectionProvider;

/// Invalidation events buffered per subscriber before it starts lagging.
const INVALIDATION_CHANNEL_CAPACITY: usize = 64;

type FetchResult = Result<CacheValue, SyncError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Default)]
struct Entry {
    /// Last successfully fetched value.
    data: Option<CacheValue>,
    /// `data` is current: fetched and not invalidated since.
    fresh: bool,
    /// Failure of the last completed fetch.
    error: Option<SyncError>,
    generation: u64,
    in_flight: Option<SharedFetch>,
}

struct SyncInner {
    connection: ConnectionProvider,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    invalidations: broadcast::Sender<QueryKey>,
}

impl SyncInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fetch result unless the key was invalidated since it started.
    fn complete(&self, key: QueryKey, generation: u64, result: &FetchResult) {
        let mut entries = self.entries();
        let entry = entries.entry(key).or_default();

        if entry.generation != generation {
            debug!(
                %key,
                generation,
                current = entry.generation,
                "Discarding result of invalidated fetch"
            );
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.fresh = true;
                entry.error = None;
                debug!(%key, generation, "Fetch stored");
            }
            Err(err) => {
                entry.fresh = false;
                entry.error = Some(err.clone());
                warn!(%key, generation, error = %err, "Fetch failed");
            }
        }
    }
}

/// Shared cache and mutation entry point.
///
/// Cheap to clone; all clones share the same cache.
#[derive(Clone)]
pub struct SyncContext {
    inner: Arc<SyncInner>,
}

impl SyncContext {
    /// Cache on top of `connection`.
    #[must_use]
    pub fn new(connection: ConnectionProvider) -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SyncInner {
                connection,
                entries: Mutex::new(HashMap::new()),
                invalidations,
            }),
        }
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionProvider {
        &self.inner.connection
    }

    /// Read `key`, fetching with `fetch` unless a fresh value is cached.
    ///
    /// Without a backend handle nothing runs and the state is loading. If a
    /// fetch for `key` is already in flight this call awaits that one.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryState<T>
    where
        T: QueryValue,
        F: FnOnce(BackendHandle) -> Fut + Send,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        let Some(backend) = self.inner.connection.current() else {
            debug!("Backend not ready, query pending");
            return self.snapshot(key, false);
        };

        let shared = {
            let mut entries = self.inner.entries();
            let entry = entries.entry(key).or_default();

            if entry.fresh
                && let Some(value) = &entry.data
            {
                debug!("Cache hit");
                return loaded(value);
            }

            if let Some(in_flight) = &entry.in_flight {
                debug!("Joining in-flight fetch");
                in_flight.clone()
            } else {
                let shared = self.spawn_fetch(key, entry.generation, fetch(backend));
                entry.in_flight = Some(shared.clone());
                shared
            }
        };

        match shared.await {
            Ok(value) => loaded(&value),
            Err(err) => self.failed(key, err),
        }
    }

    /// Current state of `key` without fetching.
    #[must_use]
    pub fn peek<T: QueryValue>(&self, key: QueryKey) -> QueryState<T> {
        self.snapshot(key, self.inner.connection.is_ready())
    }

    /// Run one remote write, invalidating `invalidates` if it succeeds.
    ///
    /// The invalidation is applied before this returns `Ok`. A failed write
    /// leaves every cached value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`] without calling the backend if no handle
    /// is available, or [`SyncError::RemoteCallFailed`] if the write fails.
    #[instrument(skip_all, fields(invalidates = ?invalidates))]
    pub async fn mutate<R, F, Fut>(&self, write: F, invalidates: &[QueryKey]) -> Result<R, SyncError>
    where
        R: Send + 'static,
        F: FnOnce(BackendHandle) -> Fut + Send,
        Fut: Future<Output = Result<R, BackendError>> + Send + 'static,
    {
        let Some(backend) = self.inner.connection.current() else {
            debug!("Backend not ready, mutation rejected");
            return Err(SyncError::NotReady);
        };

        // Spawned so the invalidation lands even if the caller goes away.
        let context = self.clone();
        let keys = invalidates.to_vec();
        let write = write(backend);
        let task = tokio::spawn(async move {
            let result = write.await;
            if result.is_ok() {
                context.invalidate(&keys);
            }
            result
        });

        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(error = %err, "Mutation failed");
                Err(err.into())
            }
            Err(err) => {
                warn!(error = %err, "Mutation task aborted");
                Err(BackendError::Aborted(err.to_string()).into())
            }
        }
    }

    /// Mark `keys` stale and notify subscribers.
    ///
    /// In-flight fetches for these keys are detached: their waiters still get
    /// a result but it is not stored.
    pub fn invalidate(&self, keys: &[QueryKey]) {
        {
            let mut entries = self.inner.entries();
            for key in keys {
                let entry = entries.entry(*key).or_default();
                entry.generation = entry.generation.wrapping_add(1);
                entry.fresh = false;
                entry.error = None;
                if entry.in_flight.take().is_some() {
                    debug!(%key, "Detached in-flight fetch");
                }
            }
        }

        for key in keys {
            debug!(%key, "Invalidated");
            // Err only means nobody is subscribed.
            let _ = self.inner.invalidations.send(*key);
        }
    }

    /// Stream of invalidated keys, for live views.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.inner.invalidations.subscribe()
    }

    fn spawn_fetch<T, Fut>(&self, key: QueryKey, generation: u64, fetch: Fut) -> SharedFetch
    where
        T: QueryValue,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        debug!(generation, "Starting fetch");

        let task = tokio::spawn({
            let inner = Arc::clone(&self.inner);
            async move {
                let result = fetch
                    .await
                    .map(QueryValue::into_cache)
                    .map_err(SyncError::from);
                inner.complete(key, generation, &result);
                result
            }
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => {
                    let result = Err(BackendError::Aborted(err.to_string()).into());
                    inner.complete(key, generation, &result);
                    result
                }
            }
        }
        .boxed()
        .shared()
    }

    fn snapshot<T: QueryValue>(&self, key: QueryKey, ready: bool) -> QueryState<T> {
        let entries = self.inner.entries();
        let Some(entry) = entries.get(&key) else {
            return QueryState::pending();
        };

        let data = entry
            .data
            .as_ref()
            .and_then(T::from_cache)
            .unwrap_or_default();

        if !ready {
            return QueryState {
                data,
                is_loading: true,
                is_error: false,
                error: None,
            };
        }

        let error = entry
            .error
            .clone()
            .filter(|_| entry.in_flight.is_none());
        QueryState {
            data,
            is_loading: !entry.fresh && error.is_none(),
            is_error: error.is_some(),
            error,
        }
    }

    fn failed<T: QueryValue>(&self, key: QueryKey, err: SyncError) -> QueryState<T> {
        let data = self
            .inner
            .entries()
            .get(&key)
            .and_then(|entry| entry.data.as_ref())
            .and_then(T::from_cache)
            .unwrap_or_default();

        QueryState {
            data,
            is_loading: false,
            is_error: true,
            error: Some(err),
        }
    }
}

fn loaded<T: QueryValue>(value: &CacheValue) -> QueryState<T> {
    let data = T::from_cache(value).unwrap_or_else(|| {
        warn!(?value, "Cached value has unexpected shape");
        T::default()
    });
    QueryState {
        data,
        is_loading: false,
        is_error: false,
        error: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use knots_folds_core::validation::ProductDraft;
    use knots_folds_core::{Price, Product, ProductId, UserRole};

    use super::*;
    use crate::backend::{MemoryBackend, method};

    fn product(id: u64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: "Hand-knotted cotton".to_string(),
            price: Price::parse("799").unwrap(),
            stock_quantity: 5,
            image_url: String::new(),
            category: "Decor".to_string(),
        }
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "Hand-knotted cotton".to_string(),
            price: Price::parse("799").unwrap(),
            stock_quantity: 5,
            image_url: String::new(),
            category: "Decor".to_string(),
        }
    }

    fn setup() -> (Arc<MemoryBackend>, SyncContext) {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_product(product(7, "Wall Hanging"));
        let handle: BackendHandle = backend.clone();
        let sync = SyncContext::new(ConnectionProvider::ready(handle));
        (backend, sync)
    }

    async fn read_products(sync: &SyncContext) -> QueryState<Vec<Product>> {
        sync.read(QueryKey::Products, |backend| async move {
            backend.get_all_products().await
        })
        .await
    }

    async fn create(sync: &SyncContext, name: &str) -> Result<ProductId, SyncError> {
        let draft = draft(name);
        sync.mutate(
            move |backend| async move { backend.create_product(&draft).await },
            &[QueryKey::Products],
        )
        .await
    }

    async fn wait_for_calls(backend: &MemoryBackend, method: &str, calls: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while backend.calls(method) < calls {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_read_without_handle_is_loading_not_error() {
        let sync = SyncContext::new(ConnectionProvider::new());

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let state = sync
            .read(QueryKey::Products, move |_| {
                flag.store(true, Ordering::SeqCst);
                async { Ok(Vec::<Product>::new()) }
            })
            .await;
        assert!(!ran.load(Ordering::SeqCst));
        assert!(state.is_loading);
        assert!(!state.is_error);
        assert!(state.data.is_empty());

        let state: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(state.is_loading);
        assert!(!state.is_error);
    }

    #[tokio::test]
    async fn test_defaults_before_first_fetch() {
        let sync = SyncContext::new(ConnectionProvider::new());
        let role: QueryState<UserRole> = sync.peek(QueryKey::CallerRole);
        let admin: QueryState<bool> = sync.peek(QueryKey::IsCallerAdmin);
        assert_eq!(role.data, UserRole::Guest);
        assert!(!admin.data);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let (backend, sync) = setup();
        backend.pause();

        let (first, second, ()) = tokio::join!(read_products(&sync), read_products(&sync), async {
            wait_for_calls(&backend, method::GET_ALL_PRODUCTS, 1).await;
            tokio::time::sleep(Duration::from_millis(10)).await;
            backend.resume();
        });

        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 1);
        assert_eq!(first.data.len(), 1);
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn test_fresh_value_is_served_from_cache() {
        let (backend, sync) = setup();
        assert!(read_products(&sync).await.is_success());
        assert!(read_products(&sync).await.is_success());
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 1);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_and_next_read_refetches() {
        let (backend, sync) = setup();
        read_products(&sync).await;

        create(&sync, "Plant Hanger").await.unwrap();

        let stale: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(stale.is_loading);
        assert_eq!(stale.data.len(), 1);

        backend.pause();
        let refetch = tokio::spawn({
            let sync = sync.clone();
            async move { read_products(&sync).await }
        });
        wait_for_calls(&backend, method::GET_ALL_PRODUCTS, 2).await;
        let in_flight: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(in_flight.is_loading);
        backend.resume();

        let state = refetch.await.unwrap();
        assert!(state.is_success());
        assert_eq!(state.data.len(), 2);
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let (backend, sync) = setup();
        let mut events = sync.subscribe();
        let before = read_products(&sync).await;

        backend.fail(method::CREATE_PRODUCT);
        let err = create(&sync, "Plant Hanger").await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteCallFailed(_)));

        let after: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(after.is_success());
        assert_eq!(after.data, before.data);
        assert!(events.try_recv().is_err());

        read_products(&sync).await;
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 1);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_invalidate_only_on_own_success() {
        let (backend, sync) = setup();
        read_products(&sync).await;
        let mut events = sync.subscribe();

        backend.fail(method::DELETE_PRODUCT);
        let delete = sync.mutate(
            |backend| async move { backend.delete_product(ProductId::new(7)).await },
            &[QueryKey::Products],
        );
        let (deleted, created) = tokio::join!(delete, create(&sync, "Plant Hanger"));
        assert!(matches!(deleted, Err(SyncError::RemoteCallFailed(_))));
        assert!(created.is_ok());

        assert_eq!(events.recv().await.unwrap(), QueryKey::Products);
        assert!(events.try_recv().is_err());

        let first = read_products(&sync).await;
        let second = read_products(&sync).await;
        assert_eq!(first.data.len(), 2);
        assert_eq!(second.data, first.data);
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 2);
    }

    #[tokio::test]
    async fn test_two_successful_invalidations_refetch_once() {
        let (backend, sync) = setup();
        read_products(&sync).await;
        let mut events = sync.subscribe();

        let (first, second) = tokio::join!(
            create(&sync, "Plant Hanger"),
            create(&sync, "Coaster Set")
        );
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(events.recv().await.unwrap(), QueryKey::Products);
        assert_eq!(events.recv().await.unwrap(), QueryKey::Products);

        let (a, b) = tokio::join!(read_products(&sync), read_products(&sync));
        assert_eq!(a.data.len(), 3);
        assert_eq!(b.data, a.data);
        read_products(&sync).await;
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 2);
    }

    #[tokio::test]
    async fn test_mutation_without_handle_never_calls_backend() {
        let (backend, sync) = setup();
        sync.connection().disconnect();

        let err = create(&sync, "Plant Hanger").await.unwrap_err();
        assert!(matches!(err, SyncError::NotReady));
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_invalidated_keys() {
        let (_backend, sync) = setup();
        let mut events = sync.subscribe();

        create(&sync, "Plant Hanger").await.unwrap();
        assert_eq!(events.recv().await.unwrap(), QueryKey::Products);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_discards_result() {
        let (backend, sync) = setup();
        backend.pause();

        let first = tokio::spawn({
            let sync = sync.clone();
            async move { read_products(&sync).await }
        });
        wait_for_calls(&backend, method::GET_ALL_PRODUCTS, 1).await;

        sync.invalidate(&[QueryKey::Products]);
        backend.resume();

        let state = first.await.unwrap();
        assert!(state.is_success());

        let cached: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(cached.is_loading);
        assert!(cached.data.is_empty());

        read_products(&sync).await;
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 2);
    }

    #[tokio::test]
    async fn test_failed_read_keeps_stale_data() {
        let (backend, sync) = setup();
        read_products(&sync).await;

        sync.invalidate(&[QueryKey::Products]);
        backend.fail(method::GET_ALL_PRODUCTS);

        let state = read_products(&sync).await;
        assert!(state.is_error);
        assert!(!state.is_loading);
        assert_eq!(state.data.len(), 1);

        let peeked: QueryState<Vec<Product>> = sync.peek(QueryKey::Products);
        assert!(peeked.is_error);
        assert_eq!(peeked.data.len(), 1);

        backend.succeed(method::GET_ALL_PRODUCTS);
        assert!(read_products(&sync).await.is_success());
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 3);
    }

    #[tokio::test]
    async fn test_first_read_failure_returns_empty_list() {
        let (backend, sync) = setup();
        backend.fail(method::GET_ALL_PRODUCTS);

        let state = read_products(&sync).await;
        assert!(state.is_error);
        assert!(state.data.is_empty());
    }
}
