//! Knots & Folds Storefront library.
//!
//! The public shop site as a library, so the router can be exercised in
//! tests without binding a socket.

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
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Full storefront router with per-request middleware, without rate limiting.
pub fn app(state: AppState) -> Router {
    build(state, routes::form_routes())
}

/// Full storefront router with form submissions rate limited per client IP.
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// limiter can key on the peer address when no proxy header is present.
pub fn rate_limited_app(state: AppState) -> Router {
    build(
        state,
        routes::form_routes().layer(middleware::form_rate_limiter()),
    )
}

fn build(state: AppState, form_routes: Router<AppState>) -> Router {
    Router::new()
        .merge(routes::routes())
        .merge(form_routes)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
