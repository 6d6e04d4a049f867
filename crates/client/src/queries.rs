//! Typed backend operations over the sync layer.
//!
//! One function per remote operation. Reads are cached under their
//! [`QueryKey`]; writes declare which keys they make stale.
//!
//! | Write | Invalidates |
//! |---|---|
//! | [`create_product`], [`update_product`], [`delete_product`] | [`QueryKey::Products`] |
//! | [`place_order`], [`update_order_status`] | [`QueryKey::Orders`] |
//! | [`submit_contact_form`], [`delete_contact_message`] | [`QueryKey::ContactMessages`] |

use knots_folds_core::validation::{NewContactMessage, NewOrder, ProductDraft};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Product, ProductId, UserRole,
};

use crate::sync::{QueryKey, QueryState, SyncContext, SyncError};

// =============================================================================
// Reads
// =============================================================================

/// All products.
pub async fn products(sync: &SyncContext) -> QueryState<Vec<Product>> {
    sync.read(QueryKey::Products, |backend| async move {
        backend.get_all_products().await
    })
    .await
}

/// All orders, newest first.
pub async fn orders(sync: &SyncContext) -> QueryState<Vec<Order>> {
    sync.read(QueryKey::Orders, |backend| async move {
        backend.get_all_orders().await
    })
    .await
    .map(|mut orders| {
        knots_folds_core::sort_newest_first(&mut orders);
        orders
    })
}

/// All contact messages.
pub async fn contact_messages(sync: &SyncContext) -> QueryState<Vec<ContactMessage>> {
    sync.read(QueryKey::ContactMessages, |backend| async move {
        backend.get_all_contact_messages().await
    })
    .await
}

/// Role of the principal the server calls the backend as.
pub async fn caller_role(sync: &SyncContext) -> QueryState<UserRole> {
    sync.read(QueryKey::CallerRole, |backend| async move {
        backend.get_caller_user_role().await
    })
    .await
}

/// Whether the backend recognises this server's principal as an admin.
pub async fn is_caller_admin(sync: &SyncContext) -> QueryState<bool> {
    sync.read(QueryKey::IsCallerAdmin, |backend| async move {
        backend.is_caller_admin().await
    })
    .await
}

// =============================================================================
// Writes
// =============================================================================

/// Add a product.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn create_product(sync: &SyncContext, draft: ProductDraft) -> Result<ProductId, SyncError> {
    sync.mutate(
        move |backend| async move { backend.create_product(&draft).await },
        &[QueryKey::Products],
    )
    .await
}

/// Replace the fields of an existing product.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn update_product(
    sync: &SyncContext,
    id: ProductId,
    draft: ProductDraft,
) -> Result<(), SyncError> {
    sync.mutate(
        move |backend| async move { backend.update_product(id, &draft).await },
        &[QueryKey::Products],
    )
    .await
}

/// Remove a product.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn delete_product(sync: &SyncContext, id: ProductId) -> Result<(), SyncError> {
    sync.mutate(
        move |backend| async move { backend.delete_product(id).await },
        &[QueryKey::Products],
    )
    .await
}

/// Place an order.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn place_order(sync: &SyncContext, order: NewOrder) -> Result<OrderId, SyncError> {
    sync.mutate(
        move |backend| async move { backend.place_order(&order).await },
        &[QueryKey::Orders],
    )
    .await
}

/// Move an order to `status`.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn update_order_status(
    sync: &SyncContext,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), SyncError> {
    sync.mutate(
        move |backend| async move { backend.update_order_status(id, status).await },
        &[QueryKey::Orders],
    )
    .await
}

/// Leave a feedback message.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn submit_contact_form(
    sync: &SyncContext,
    message: NewContactMessage,
) -> Result<(), SyncError> {
    sync.mutate(
        move |backend| async move { backend.submit_contact_form(&message).await },
        &[QueryKey::ContactMessages],
    )
    .await
}

/// Remove a feedback message.
///
/// # Errors
///
/// Returns [`SyncError`] if the backend is not ready or rejects the call.
pub async fn delete_contact_message(
    sync: &SyncContext,
    id: ContactMessageId,
) -> Result<(), SyncError> {
    sync.mutate(
        move |backend| async move { backend.delete_contact_message(id).await },
        &[QueryKey::ContactMessages],
    )
    .await
}
