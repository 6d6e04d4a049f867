//! Read state and error types of the sync layer.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by the sync layer.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// No backend handle yet. Reads report this as loading, never as an error.
    #[error("backend connection is not ready")]
    NotReady,

    /// The remote call failed.
    #[error("remote call failed: {0}")]
    RemoteCallFailed(Arc<BackendError>),
}

impl From<BackendError> for SyncError {
    fn from(err: BackendError) -> Self {
        Self::RemoteCallFailed(Arc::new(err))
    }
}

/// What a view sees when it reads a key.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    /// Last known value, or the default if nothing was ever fetched.
    pub data: T,
    /// A fetch is pending or has not been able to start yet.
    pub is_loading: bool,
    /// The last fetch failed; `data` is stale.
    pub is_error: bool,
    /// The failure behind `is_error`.
    pub error: Option<SyncError>,
}

impl<T> QueryState<T> {
    /// Data is present and current.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !self.is_loading && !self.is_error
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        QueryState {
            data: f(self.data),
            is_loading: self.is_loading,
            is_error: self.is_error,
            error: self.error,
        }
    }
}

impl<T: Default> QueryState<T> {
    /// Pending state with default data.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            data: T::default(),
            is_loading: true,
            is_error: false,
            error: None,
        }
    }
}
