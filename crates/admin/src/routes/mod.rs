//! HTTP route handlers for admin.
//!
//! Every dashboard tab is a full page wrapping a table fragment. The
//! fragments are also served on their own under `/partials/` and re-fetch
//! themselves when the live-update stream reports their key as stale.

pub mod auth;
pub mod events;
pub mod feedback;
pub mod health;
pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use knots_folds_client::{QueryState, queries};

use crate::error::Result;
use crate::state::AppState;

/// Build the admin router.
///
/// `limit_login` puts the password rate limiter on `POST /auth/login`; it
/// needs the client address, so routers exercised without a socket leave it
/// off.
pub fn routes(limit_login: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/health", get(health::health))
        .merge(auth::router(limit_login))
        .merge(products::router())
        .merge(orders::router())
        .merge(feedback::router())
        .merge(events::router())
}

/// Render a template to an HTML response.
///
/// # Errors
///
/// Returns `AppError::Template` if rendering fails.
pub fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Dashboard chrome shared by the tab pages.
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    /// Path of the active tab
    pub current_path: &'static str,
    /// The backend answered that this server is not calling as an admin.
    pub caller_not_admin: bool,
}

impl DashboardLayout {
    /// Build the layout for a tab, checking the caller's admin status.
    ///
    /// The warning only shows once the backend has actually answered `false`.
    pub async fn load(state: &AppState, current_path: &'static str) -> Self {
        let is_admin = queries::is_caller_admin(state.sync()).await;
        Self {
            current_path,
            caller_not_admin: is_admin.is_success() && !is_admin.data,
        }
    }

    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// A table fragment's rows plus the read status behind them.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    pub is_loading: bool,
    pub is_error: bool,
    /// Inline message about a failed write on this table.
    pub notice: Option<String>,
}

impl<T> TableView<T> {
    /// Build rows from a list read. Stale rows stay visible on error.
    pub fn from_state<E>(state: &QueryState<Vec<E>>, row: impl Fn(&E) -> T) -> Self {
        Self {
            rows: state.data.iter().map(row).collect(),
            // Cached rows are shown while a refetch is in flight
            is_loading: state.is_loading && state.data.is_empty(),
            is_error: state.is_error,
            notice: None,
        }
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Nothing to list and nothing pending.
    #[must_use]
    pub fn shows_empty(&self) -> bool {
        !self.is_loading && !self.is_error && self.rows.is_empty()
    }

    /// "3 orders", "1 message"
    #[must_use]
    pub fn count_label(&self, noun: &str) -> String {
        let count = self.rows.len();
        if count == 1 {
            format!("{count} {noun}")
        } else {
            format!("{count} {noun}s")
        }
    }
}
