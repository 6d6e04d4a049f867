//! Application state shared across handlers.

use std::sync::Arc;

use knots_folds_client::{ConnectionProvider, SyncContext};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The sync context owns the query cache and
/// the backend connection provider for the whole process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    sync: SyncContext,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, sync: SyncContext) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, sync }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend query cache.
    #[must_use]
    pub fn sync(&self) -> &SyncContext {
        &self.inner.sync
    }

    /// Get a reference to the backend connection provider.
    #[must_use]
    pub fn connection(&self) -> &ConnectionProvider {
        self.inner.sync.connection()
    }
}
