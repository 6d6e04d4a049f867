//! In-memory backend for tests and local development.
//!
//! Behaves like the real backend (ids assigned sequentially, orders stamped
//! with the current time, unknown ids rejected) and records how often each
//! remote method was called. Individual methods can be made to fail, and all
//! calls can be paused to observe in-flight states.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use knots_folds_core::validation::{NewContactMessage, NewOrder, ProductDraft};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Product, ProductId, Timestamp,
    UserRole,
};
use tokio::sync::watch;

use super::{Backend, BackendError, method};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    messages: BTreeMap<ContactMessageId, ContactMessage>,
    next_id: u64,
    caller_role: UserRole,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process [`Backend`] with call counters and failure injection.
#[derive(Debug)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    paused: watch::Sender<bool>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty backend whose caller is a guest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            paused: watch::Sender::new(false),
        }
    }

    /// Set the role reported for the caller.
    #[must_use]
    pub fn with_caller_role(self, role: UserRole) -> Self {
        lock(&self.tables).caller_role = role;
        self
    }

    /// Insert a product with an explicit id.
    pub fn seed_product(&self, product: Product) {
        let mut tables = lock(&self.tables);
        tables.next_id = tables.next_id.max(product.id.as_u64());
        tables.products.insert(product.id, product);
    }

    /// Insert an order with an explicit id and timestamp.
    pub fn seed_order(&self, order: Order) {
        let mut tables = lock(&self.tables);
        tables.next_id = tables.next_id.max(order.id.as_u64());
        tables.orders.insert(order.id, order);
    }

    /// Insert a contact message with an explicit id and timestamp.
    pub fn seed_message(&self, message: ContactMessage) {
        let mut tables = lock(&self.tables);
        tables.next_id = tables.next_id.max(message.id.as_u64());
        tables.messages.insert(message.id, message);
    }

    /// Number of times `method` (a [`method`] constant) was called.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        lock(&self.calls).get(method).copied().unwrap_or(0)
    }

    /// Total number of calls across all methods.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// Make every subsequent call to `method` fail with [`BackendError::Remote`].
    pub fn fail(&self, method: &'static str) {
        lock(&self.failing).insert(method);
    }

    /// Undo [`fail`](Self::fail).
    pub fn succeed(&self, method: &'static str) {
        lock(&self.failing).remove(method);
    }

    /// Hold every call (after it is counted) until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Current products, bypassing call accounting.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.tables).products.values().cloned().collect()
    }

    /// Current orders, bypassing call accounting.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.tables).orders.values().cloned().collect()
    }

    /// Current contact messages, bypassing call accounting.
    #[must_use]
    pub fn messages(&self) -> Vec<ContactMessage> {
        lock(&self.tables).messages.values().cloned().collect()
    }

    /// Count the call, wait while paused, then apply injected failures.
    async fn enter(&self, method: &'static str) -> Result<(), BackendError> {
        *lock(&self.calls).entry(method).or_insert(0) += 1;

        let mut paused = self.paused.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = paused.wait_for(|paused| !*paused).await;

        if lock(&self.failing).contains(method) {
            return Err(BackendError::Remote {
                method,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(method: &'static str, what: &str, id: u64) -> BackendError {
    BackendError::Remote {
        method,
        message: format!("{what} {id} not found"),
    }
}

fn product_from_draft(id: ProductId, draft: &ProductDraft) -> Product {
    Product {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        price: draft.price,
        stock_quantity: draft.stock_quantity,
        image_url: draft.image_url.clone(),
        category: draft.category.clone(),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_all_products(&self) -> Result<Vec<Product>, BackendError> {
        self.enter(method::GET_ALL_PRODUCTS).await?;
        Ok(self.products())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError> {
        self.enter(method::CREATE_PRODUCT).await?;
        let mut tables = lock(&self.tables);
        let id = ProductId::new(tables.allocate_id());
        tables.products.insert(id, product_from_draft(id, draft));
        Ok(id)
    }

    async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<(), BackendError> {
        self.enter(method::UPDATE_PRODUCT).await?;
        let mut tables = lock(&self.tables);
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| not_found(method::UPDATE_PRODUCT, "product", id.as_u64()))?;
        *product = product_from_draft(id, draft);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.enter(method::DELETE_PRODUCT).await?;
        lock(&self.tables)
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(method::DELETE_PRODUCT, "product", id.as_u64()))
    }

    async fn get_all_orders(&self) -> Result<Vec<Order>, BackendError> {
        self.enter(method::GET_ALL_ORDERS).await?;
        Ok(self.orders())
    }

    async fn place_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        self.enter(method::PLACE_ORDER).await?;
        let mut tables = lock(&self.tables);
        let id = OrderId::new(tables.allocate_id());
        tables.orders.insert(
            id,
            Order {
                id,
                customer_name: order.customer_name.clone(),
                phone: order.phone.clone(),
                address: order.address.clone(),
                product_id: order.product_id,
                quantity: order.quantity,
                status: OrderStatus::Pending,
                created_at: Timestamp::now(),
            },
        );
        Ok(id)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        self.enter(method::UPDATE_ORDER_STATUS).await?;
        let mut tables = lock(&self.tables);
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| not_found(method::UPDATE_ORDER_STATUS, "order", id.as_u64()))?;
        order.status = status;
        Ok(())
    }

    async fn get_all_contact_messages(&self) -> Result<Vec<ContactMessage>, BackendError> {
        self.enter(method::GET_ALL_CONTACT_MESSAGES).await?;
        Ok(self.messages())
    }

    async fn submit_contact_form(&self, message: &NewContactMessage) -> Result<(), BackendError> {
        self.enter(method::SUBMIT_CONTACT_FORM).await?;
        let mut tables = lock(&self.tables);
        let id = ContactMessageId::new(tables.allocate_id());
        tables.messages.insert(
            id,
            ContactMessage {
                id,
                name: message.name.clone(),
                email: message.email.to_string(),
                message: message.message.clone(),
                created_at: Timestamp::now(),
            },
        );
        Ok(())
    }

    async fn delete_contact_message(&self, id: ContactMessageId) -> Result<(), BackendError> {
        self.enter(method::DELETE_CONTACT_MESSAGE).await?;
        lock(&self.tables)
            .messages
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(method::DELETE_CONTACT_MESSAGE, "message", id.as_u64()))
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, BackendError> {
        self.enter(method::GET_CALLER_USER_ROLE).await?;
        Ok(lock(&self.tables).caller_role)
    }

    async fn is_caller_admin(&self) -> Result<bool, BackendError> {
        self.enter(method::IS_CALLER_ADMIN).await?;
        Ok(lock(&self.tables).caller_role == UserRole::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use knots_folds_core::Price;

    use super::*;

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "Hand-knotted".to_string(),
            price: Price::parse("499").unwrap(),
            stock_quantity: 4,
            image_url: String::new(),
            category: "Decor".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete_product() {
        let backend = MemoryBackend::new();
        let id = backend.create_product(&draft("Plant Hanger")).await.unwrap();
        backend.update_product(id, &draft("Plant Hanger XL")).await.unwrap();

        let products = backend.get_all_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Plant Hanger XL");

        backend.delete_product(id).await.unwrap();
        assert!(backend.get_all_products().await.unwrap().is_empty());
        assert!(backend.delete_product(id).await.is_err());
        assert_eq!(backend.calls(method::DELETE_PRODUCT), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_is_counted() {
        let backend = MemoryBackend::new();
        backend.fail(method::GET_ALL_ORDERS);
        assert!(matches!(
            backend.get_all_orders().await,
            Err(BackendError::Remote { .. })
        ));
        assert_eq!(backend.calls(method::GET_ALL_ORDERS), 1);

        backend.succeed(method::GET_ALL_ORDERS);
        assert!(backend.get_all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_caller_role() {
        let backend = MemoryBackend::new().with_caller_role(UserRole::Admin);
        assert!(backend.is_caller_admin().await.unwrap());
        assert_eq!(backend.get_caller_user_role().await.unwrap(), UserRole::Admin);
        assert!(!MemoryBackend::new().is_caller_admin().await.unwrap());
    }

    #[tokio::test]
    async fn test_pause_holds_calls() {
        let backend = Arc::new(MemoryBackend::new());
        backend.pause();

        let task = tokio::spawn({
            let backend = Arc::clone(&backend);
            async move { backend.get_all_products().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        assert_eq!(backend.calls(method::GET_ALL_PRODUCTS), 1);

        backend.resume();
        assert!(task.await.unwrap().unwrap().is_empty());
    }
}
