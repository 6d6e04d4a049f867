//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (hero, showcase, about, contact)
//! GET  /health                 - Liveness
//! GET  /health/ready           - Backend readiness
//!
//! # HTMX fragments
//! GET  /products/showcase      - Product grid
//! GET  /orders/new             - Order form (?product_id= preselects)
//! POST /orders                 - Place order (confirmation or form with errors)
//! GET  /contact/new            - Blank feedback form
//! POST /contact                - Submit feedback (thank-you or form with errors)
//! ```

pub mod contact;
pub mod health;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Pages, fragments and health probes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/products/showcase", get(products::showcase))
        .route("/orders/new", get(orders::new_form))
        .route("/contact/new", get(contact::form))
}

/// Form submissions, kept apart so they can be rate limited.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::place))
        .route("/contact", post(contact::submit))
}
