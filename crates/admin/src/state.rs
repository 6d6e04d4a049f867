//! Application state shared across handlers.

use std::sync::Arc;

use knots_folds_client::{ConnectionProvider, SyncContext};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; the query cache is shared by every request so the
/// live-update stream sees invalidations from every tab.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    sync: SyncContext,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, sync: SyncContext) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, sync }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the shared query cache.
    #[must_use]
    pub fn sync(&self) -> &SyncContext {
        &self.inner.sync
    }

    /// Get the backend connection provider.
    #[must_use]
    pub fn connection(&self) -> &ConnectionProvider {
        self.inner.sync.connection()
    }
}
