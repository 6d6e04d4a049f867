//! Process-wide provider of the backend handle.
//!
//! Readers take snapshots; the provider is the only writer. Establishing a
//! connection (or reconnecting) swaps the whole handle in one step, so a
//! reader sees either the old handle or the new one, never a mix.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::backend::{BackendError, BackendHandle};

/// Errors from connection establishment.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The connector failed; the previous handle (if any) is kept.
    #[error("failed to connect to backend: {0}")]
    Backend(#[from] BackendError),

    /// The provider was dropped while waiting.
    #[error("connection provider closed")]
    Closed,
}

#[derive(Clone, Default)]
struct ConnectionState {
    handle: Option<BackendHandle>,
    establishing: bool,
}

impl ConnectionState {
    const fn is_ready(&self) -> bool {
        self.handle.is_some() && !self.establishing
    }
}

/// Holder of the current backend handle.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ConnectionProvider {
    state: Arc<watch::Sender<ConnectionState>>,
}

impl Default for ConnectionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ConnectionProvider")
            .field("connected", &state.handle.is_some())
            .field("establishing", &state.establishing)
            .finish()
    }
}

impl ConnectionProvider {
    /// Provider with no handle; reads stay pending until one is established.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(ConnectionState::default())),
        }
    }

    /// Provider that is already connected to `backend`.
    #[must_use]
    pub fn ready(backend: BackendHandle) -> Self {
        let provider = Self::new();
        provider.replace(backend);
        provider
    }

    /// Snapshot of `(handle, is_establishing)`.
    #[must_use]
    pub fn handle(&self) -> (Option<BackendHandle>, bool) {
        let state = self.state.borrow();
        (state.handle.clone(), state.establishing)
    }

    /// The handle, if present and not being re-established.
    #[must_use]
    pub fn current(&self) -> Option<BackendHandle> {
        let state = self.state.borrow();
        if state.is_ready() {
            state.handle.clone()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    /// Wait until a handle is present and not being re-established.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Closed`] if the provider is dropped while waiting.
    pub async fn wait_ready(&self) -> Result<BackendHandle, ConnectError> {
        let mut receiver = self.state.subscribe();
        let state = receiver
            .wait_for(ConnectionState::is_ready)
            .await
            .map_err(|_| ConnectError::Closed)?;
        state.handle.clone().ok_or(ConnectError::Closed)
    }

    /// Publish `backend` as the current handle.
    pub fn replace(&self, backend: BackendHandle) {
        self.state.send_modify(|state| {
            state.handle = Some(backend);
            state.establishing = false;
        });
    }

    /// Drop the current handle; reads fall back to pending.
    pub fn disconnect(&self) {
        self.state.send_modify(|state| {
            state.handle = None;
            state.establishing = false;
        });
        info!("Backend handle cleared");
    }

    /// Run `connector` once and publish its handle.
    ///
    /// While the connector runs the provider reports `is_establishing`. On
    /// failure the previous handle (if any) is kept and the flag cleared.
    ///
    /// # Errors
    ///
    /// Returns the connector's error.
    #[instrument(skip_all)]
    pub async fn establish<F, Fut>(&self, connector: F) -> Result<(), ConnectError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BackendHandle, BackendError>>,
    {
        self.state.send_modify(|state| state.establishing = true);

        match connector().await {
            Ok(backend) => {
                self.replace(backend);
                info!("Backend connection established");
                Ok(())
            }
            Err(e) => {
                self.state.send_modify(|state| state.establishing = false);
                warn!(error = %e, "Backend connection attempt failed");
                Err(e.into())
            }
        }
    }

    /// Keep calling `connector` every `retry_interval` until it succeeds.
    ///
    /// Startup reconnect loop; the servers begin serving immediately and
    /// reads stay pending until the first success.
    pub fn spawn_establish<F, Fut>(&self, connector: F, retry_interval: Duration) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BackendHandle, BackendError>> + Send + 'static,
    {
        let provider = self.clone();
        tokio::spawn(async move {
            let mut attempt: u32 = 0;
            loop {
                attempt = attempt.saturating_add(1);
                if provider.establish(&connector).await.is_ok() {
                    return;
                }
                warn!(
                    attempt,
                    retry_in_secs = retry_interval.as_secs(),
                    "Retrying backend connection"
                );
                tokio::time::sleep(retry_interval).await;
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::backend::MemoryBackend;

    fn memory() -> BackendHandle {
        Arc::new(MemoryBackend::new())
    }

    #[test]
    fn test_new_provider_has_no_handle() {
        let provider = ConnectionProvider::new();
        let (handle, establishing) = provider.handle();
        assert!(handle.is_none());
        assert!(!establishing);
        assert!(provider.current().is_none());
    }

    #[test]
    fn test_ready_provider() {
        let provider = ConnectionProvider::ready(memory());
        assert!(provider.is_ready());
        assert!(provider.current().is_some());

        provider.disconnect();
        assert!(!provider.is_ready());
    }

    #[tokio::test]
    async fn test_establish_failure_keeps_previous_handle() {
        let provider = ConnectionProvider::ready(memory());
        let before = provider.current().unwrap();

        let result = provider
            .establish(|| async {
                Err(BackendError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
            })
            .await;

        assert!(matches!(result, Err(ConnectError::Backend(_))));
        let after = provider.current().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(!provider.handle().1);
    }

    #[tokio::test]
    async fn test_not_ready_while_establishing() {
        let provider = ConnectionProvider::ready(memory());
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn({
            let provider = provider.clone();
            async move {
                provider
                    .establish(|| async move {
                        wait.await.ok();
                        Ok(memory())
                    })
                    .await
            }
        });

        tokio::task::yield_now().await;
        while !provider.handle().1 {
            tokio::task::yield_now().await;
        }
        assert!(provider.current().is_none());

        release.send(()).unwrap();
        task.await.unwrap().unwrap();
        assert!(provider.is_ready());
    }

    #[tokio::test]
    async fn test_spawn_establish_retries_until_success() {
        let provider = ConnectionProvider::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&attempts);
        provider.spawn_establish(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(BackendError::Aborted("not yet".into()))
                    } else {
                        Ok(memory())
                    }
                }
            },
            Duration::from_millis(5),
        );

        let handle = tokio::time::timeout(Duration::from_secs(5), provider.wait_ready())
            .await
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&handle, &provider.current().unwrap()));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
