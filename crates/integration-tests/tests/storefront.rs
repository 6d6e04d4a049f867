//! Storefront router tests: showcase states, order and feedback forms.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use knots_folds_client::{MemoryBackend, QueryKey};
use knots_folds_client::backend::method;
use knots_folds_core::OrderStatus;
use knots_folds_integration_tests::{body_text, get, post_form, product, send, storefront};

fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_product(product(3, "Bunny Plush", 4));
    backend.seed_product(product(4, "Ear Warmer", 0));
    backend
}

// =============================================================================
// Showcase
// =============================================================================

#[tokio::test]
async fn test_home_renders_live_products() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let response = send(&router, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Bunny Plush"));
    assert!(body.contains("₹499.00"));
    assert!(body.contains("product_id=3"));
}

#[tokio::test]
async fn test_showcase_is_loading_until_backend_connects() {
    let (router, _) = storefront(None);

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("aria-busy=\"true\""));
    assert!(!body.contains("Failed to load products"));
}

#[tokio::test]
async fn test_showcase_reports_backend_failure() {
    let backend = seeded_backend();
    backend.fail(method::GET_ALL_PRODUCTS);
    let (router, _) = storefront(Some(&backend));

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("Failed to load products. Please try again later."));
}

#[tokio::test]
async fn test_failed_refetch_keeps_cached_products_under_the_banner() {
    let backend = seeded_backend();
    let (router, sync) = storefront(Some(&backend));

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("Bunny Plush"));

    sync.invalidate(&[QueryKey::Products]);
    backend.fail(method::GET_ALL_PRODUCTS);

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("Failed to load products. Please try again later."));
    assert!(body.contains("Bunny Plush"));
    assert!(!body.contains("Woolen Accessories"));
}

#[tokio::test]
async fn test_lost_connection_keeps_cached_products() {
    let backend = seeded_backend();
    let (router, sync) = storefront(Some(&backend));
    send(&router, get("/products/showcase")).await;

    sync.connection().disconnect();

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("Bunny Plush"));
    assert!(!body.contains("aria-busy"));
    assert!(!body.contains("Failed to load products"));
}

#[tokio::test]
async fn test_empty_catalogue_shows_categories() {
    let backend = Arc::new(MemoryBackend::new());
    let (router, _) = storefront(Some(&backend));

    let body = body_text(send(&router, get("/products/showcase")).await).await;
    assert!(body.contains("Woolen Toys"));
    assert!(body.contains("Knitted Headbands"));
    assert!(body.contains("Woolen Accessories"));
}

#[tokio::test]
async fn test_concurrent_showcase_requests_share_one_fetch() {
    let backend = seeded_backend();
    backend.pause();
    let (router, _) = storefront(Some(&backend));

    let (first, second, ()) = tokio::join!(
        send(&router, get("/products/showcase")),
        send(&router, get("/products/showcase")),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            backend.resume();
        }
    );

    assert!(body_text(first).await.contains("Bunny Plush"));
    assert!(body_text(second).await.contains("Bunny Plush"));
    assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 1);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_form_preselects_product() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let body = body_text(send(&router, get("/orders/new?product_id=3")).await).await;
    assert!(body.contains("value=\"3\" selected"));
}

#[tokio::test]
async fn test_order_form_rejects_non_numeric_product() {
    let (router, _) = storefront(Some(&seeded_backend()));

    let response = send(&router, get("/orders/new?product_id=teddy")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_quantity_never_reaches_backend() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let response = send(
        &router,
        post_form(
            "/orders",
            "customer_name=Asha&phone=9876543210&address=12+Lake+Road&product_id=3&quantity=0",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Please enter a valid quantity (min 1)."));
    // Input is kept
    assert!(body.contains("12 Lake Road"));
    assert_eq!(backend.calls(method::PLACE_ORDER), 0);
}

#[tokio::test]
async fn test_valid_order_is_placed_pending() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let body = body_text(
        send(
            &router,
            post_form(
                "/orders",
                "customer_name=Asha&phone=%2B91+98765+43210&address=12+Lake+Road&product_id=3&quantity=2",
            ),
        )
        .await,
    )
    .await;

    assert!(body.contains("Order Placed!"));
    assert!(body.contains("Thank you, Asha!"));

    let orders = backend.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].quantity, 2);
    assert_eq!(orders[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_rejected_order_keeps_input() {
    let backend = seeded_backend();
    backend.fail(method::PLACE_ORDER);
    let (router, _) = storefront(Some(&backend));

    let body = body_text(
        send(
            &router,
            post_form(
                "/orders",
                "customer_name=Asha&phone=9876543210&address=12+Lake+Road&product_id=3&quantity=1",
            ),
        )
        .await,
    )
    .await;

    assert!(body.contains("Something went wrong placing your order. Please try again."));
    assert!(body.contains("Asha"));
    assert!(backend.orders().is_empty());
}

#[tokio::test]
async fn test_order_while_connecting_fails_softly() {
    let (router, _) = storefront(None);

    let body = body_text(
        send(
            &router,
            post_form(
                "/orders",
                "customer_name=Asha&phone=9876543210&address=12+Lake+Road&product_id=3&quantity=1",
            ),
        )
        .await,
    )
    .await;

    assert!(body.contains("Something went wrong placing your order. Please try again."));
}

// =============================================================================
// Contact
// =============================================================================

#[tokio::test]
async fn test_invalid_email_never_reaches_backend() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let body = body_text(
        send(
            &router,
            post_form(
                "/contact",
                "name=Meera&email=not-an-email&message=Loved+the+bunny+plush%21",
            ),
        )
        .await,
    )
    .await;

    assert!(body.contains("Please enter a valid email address."));
    assert!(body.contains("not-an-email"));
    assert_eq!(backend.calls(method::SUBMIT_CONTACT_FORM), 0);
}

#[tokio::test]
async fn test_short_feedback_rejected() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let body = body_text(
        send(
            &router,
            post_form("/contact", "name=Meera&email=meera%40example.com&message=Nice"),
        )
        .await,
    )
    .await;

    assert!(body.contains("Feedback must be at least 10 characters."));
    assert_eq!(backend.calls(method::SUBMIT_CONTACT_FORM), 0);
}

#[tokio::test]
async fn test_feedback_submitted() {
    let backend = seeded_backend();
    let (router, _) = storefront(Some(&backend));

    let body = body_text(
        send(
            &router,
            post_form(
                "/contact",
                "name=Meera&email=meera%40example.com&message=Loved+the+bunny+plush%21",
            ),
        )
        .await,
    )
    .await;

    assert!(body.contains("Thank you for your feedback!"));
    let messages = backend.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].email, "meera@example.com");
}

#[tokio::test]
async fn test_blank_contact_form() {
    let (router, _) = storefront(None);

    let response = send(&router, get("/contact/new")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("id=\"contact-form\""));
}

// =============================================================================
// Health and chrome
// =============================================================================

#[tokio::test]
async fn test_readiness_follows_backend_connection() {
    let (connecting, _) = storefront(None);
    assert_eq!(
        send(&connecting, get("/health/ready")).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        send(&connecting, get("/health")).await.status(),
        StatusCode::OK
    );

    let (ready, _) = storefront(Some(&seeded_backend()));
    assert_eq!(
        send(&ready, get("/health/ready")).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let (router, _) = storefront(None);

    let response = send(&router, get("/health")).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (router, _) = storefront(None);

    let response = send(&router, get("/wishlist")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
