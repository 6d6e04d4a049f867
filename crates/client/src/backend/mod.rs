//! Shop backend binding.
//!
//! The backend is an opaque remote service exposing the product catalogue,
//! orders, contact messages and an authorization check. [`Backend`] is the
//! typed surface the rest of the workspace programs against; [`HttpBackend`]
//! speaks the JSON gateway protocol and, behind the `testing` feature,
//! [`MemoryBackend`] keeps everything in process.

mod http;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use knots_folds_core::validation::{NewContactMessage, NewOrder, ProductDraft};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Product, ProductId, UserRole,
};
use thiserror::Error;

pub use http::HttpBackend;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryBackend;

/// Shared handle to the connected backend.
pub type BackendHandle = Arc<dyn Backend>;

/// Remote method names, as used on the wire.
pub mod method {
    pub const GET_ALL_PRODUCTS: &str = "getAllProducts";
    pub const CREATE_PRODUCT: &str = "createProduct";
    pub const UPDATE_PRODUCT: &str = "updateProduct";
    pub const DELETE_PRODUCT: &str = "deleteProduct";
    pub const GET_ALL_ORDERS: &str = "getAllOrders";
    pub const PLACE_ORDER: &str = "placeOrder";
    pub const UPDATE_ORDER_STATUS: &str = "updateOrderStatus";
    pub const GET_ALL_CONTACT_MESSAGES: &str = "getAllContactMessages";
    pub const SUBMIT_CONTACT_FORM: &str = "submitContactForm";
    pub const DELETE_CONTACT_MESSAGE: &str = "deleteContactMessage";
    pub const GET_CALLER_USER_ROLE: &str = "getCallerUserRole";
    pub const IS_CALLER_ADMIN: &str = "isCallerAdmin";
}

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not match the expected record shape.
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    /// The backend rejected the call (trap, unauthorized caller, unknown id).
    #[error("backend rejected {method}: {message}")]
    Remote {
        method: &'static str,
        message: String,
    },

    /// The task running the call ended without producing a result.
    #[error("backend call aborted: {0}")]
    Aborted(String),
}

impl BackendError {
    pub(crate) fn decode(what: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            reason: reason.to_string(),
        }
    }
}

/// Typed surface of the shop backend.
///
/// Every method is one remote call; implementations perform no caching.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// All products in the catalogue.
    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Add a product, returning its new id.
    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError>;

    /// Replace every field of an existing product.
    async fn update_product(&self, id: ProductId, draft: &ProductDraft)
    -> Result<(), BackendError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;

    /// All orders, in backend order.
    async fn get_all_orders(&self) -> Result<Vec<Order>, BackendError>;

    /// Place an order, returning its new id.
    async fn place_order(&self, order: &NewOrder) -> Result<OrderId, BackendError>;

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError>;

    async fn get_all_contact_messages(&self) -> Result<Vec<ContactMessage>, BackendError>;

    async fn submit_contact_form(&self, message: &NewContactMessage) -> Result<(), BackendError>;

    async fn delete_contact_message(&self, id: ContactMessageId) -> Result<(), BackendError>;

    /// Role of the principal making the calls.
    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError>;

    /// Whether the principal making the calls is an admin.
    async fn is_caller_admin(&self) -> Result<bool, BackendError>;
}
