//! Remote-owned records moved across the backend boundary.
//!
//! These are the decoded, validated shapes. Wire decoding (camelCase JSON,
//! float prices, signed integers) lives in the client crate and converts
//! into these types fail-fast.

use serde::{Deserialize, Serialize};

use super::{ContactMessageId, OrderId, OrderStatus, Price, ProductId, Timestamp};

/// A product in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock_quantity: u64,
    /// Image URL or site-relative asset path; may be empty.
    pub image_url: String,
    pub category: String,
}

impl Product {
    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
    pub status: OrderStatus,
    pub created_at: Timestamp,
}

/// A feedback message left through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// Sort orders newest first, breaking ties by descending id.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, nanos: i64) -> Order {
        Order {
            id: OrderId::new(id),
            customer_name: "Priya".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 MG Road".to_string(),
            product_id: ProductId::new(1),
            quantity: 1,
            status: OrderStatus::Pending,
            created_at: Timestamp::from_nanos(nanos),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut orders = vec![order(1, 10), order(2, 30), order(3, 20), order(4, 30)];
        sort_newest_first(&mut orders);
        let ids: Vec<u64> = orders.iter().map(|o| o.id.as_u64()).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }
}
