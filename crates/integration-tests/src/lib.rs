//! Integration test harness for Knots & Folds.
//!
//! Builds the storefront and admin routers against an in-memory backend and
//! drives them with `tower::ServiceExt::oneshot`, so no sockets or external
//! services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p knots-folds-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use knots_folds_admin::config::AdminConfig;
use knots_folds_client::{BackendHandle, ConnectionProvider, MemoryBackend, SyncContext};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Price, Product, ProductId,
    Timestamp,
};
use knots_folds_storefront::config::StorefrontConfig;
use tower::ServiceExt;

/// Password the test admin router accepts.
pub const ADMIN_PASSWORD: &str = "purl-and-plain";

/// Backend URL placed in test configs; never contacted.
const UNUSED_BACKEND_URL: &str = "http://127.0.0.1:9";

// =============================================================================
// Fixtures
// =============================================================================

#[must_use]
pub fn product(id: u64, name: &str, stock_quantity: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("Hand-knitted {name}"),
        price: Price::parse("499").unwrap(),
        stock_quantity,
        image_url: String::new(),
        category: "Woolen Toys".to_string(),
    }
}

/// An order placed `minutes` minutes after the epoch.
#[must_use]
pub fn order(id: u64, customer_name: &str, status: OrderStatus, minutes: i64) -> Order {
    Order {
        id: OrderId::new(id),
        customer_name: customer_name.to_string(),
        phone: "+91 98765 43210".to_string(),
        address: "12 Lake Road, Pune".to_string(),
        product_id: ProductId::new(1),
        quantity: 1,
        status,
        created_at: Timestamp::from_nanos(minutes * 60 * 1_000_000_000),
    }
}

#[must_use]
pub fn message(id: u64, name: &str, text: &str) -> ContactMessage {
    ContactMessage {
        id: ContactMessageId::new(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        message: text.to_string(),
        created_at: Timestamp::from_nanos(i64::try_from(id).unwrap() * 1_000_000_000),
    }
}

// =============================================================================
// Routers
// =============================================================================

fn connection(backend: Option<&Arc<MemoryBackend>>) -> ConnectionProvider {
    match backend {
        Some(backend) => {
            let handle: BackendHandle = backend.clone();
            ConnectionProvider::ready(handle)
        }
        None => ConnectionProvider::new(),
    }
}

/// Storefront router and its shared cache. `None` leaves the backend
/// handle unestablished.
#[must_use]
pub fn storefront(backend: Option<&Arc<MemoryBackend>>) -> (Router, SyncContext) {
    let sync = SyncContext::new(connection(backend));
    let config = StorefrontConfig::local(UNUSED_BACKEND_URL).unwrap();
    let state = knots_folds_storefront::state::AppState::new(config, sync.clone());
    (knots_folds_storefront::app(state), sync)
}

/// Admin router and its shared cache. `None` leaves the backend handle
/// unestablished.
#[must_use]
pub fn admin(backend: Option<&Arc<MemoryBackend>>) -> (Router, SyncContext) {
    let sync = SyncContext::new(connection(backend));
    let config = AdminConfig::local(UNUSED_BACKEND_URL, ADMIN_PASSWORD).unwrap();
    let state = knots_folds_admin::state::AppState::new(config, sync.clone());
    (knots_folds_admin::app(state), sync)
}

// =============================================================================
// Requests
// =============================================================================

#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// GET as htmx sends it.
#[must_use]
pub fn htmx_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap()
}

#[must_use]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Attach a session cookie.
#[must_use]
pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `Location` of a redirect response.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// `name=value` of the response's session cookie.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("kf_admin_session="))
        .and_then(|value| value.split(';').next())
        .map(String::from)
}

/// Log in to the admin router and return the session cookie.
pub async fn login(router: &Router) -> String {
    let response = send(
        router,
        post_form("/auth/login", &format!("password={ADMIN_PASSWORD}")),
    )
    .await;
    assert_eq!(location(&response), Some("/products"));
    session_cookie(&response).unwrap()
}
