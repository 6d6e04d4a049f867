//! Knots & Folds Admin library.
//!
//! The store management back-office as a library, so the router can be
//! exercised in tests without binding a socket.
//!
//! # Security
//!
//! The password gate only decides which pages are rendered. Every write is
//! authorized by the shop backend against the principal this server calls
//! as; deploy behind a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Full admin router with sessions, without login rate limiting.
pub fn app(state: AppState) -> Router {
    build(state, false)
}

/// Full admin router with password attempts rate limited per client IP.
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// limiter can key on the peer address when no proxy header is present.
pub fn rate_limited_app(state: AppState) -> Router {
    build(state, true)
}

fn build(state: AppState, limit_login: bool) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes(limit_login))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
