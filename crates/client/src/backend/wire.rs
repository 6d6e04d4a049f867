//! JSON records exchanged with the backend gateway and their conversions.
//!
//! Decoding is fail-fast: a record with a missing field, a negative price,
//! a zero quantity or an unknown status fails the whole call.

use knots_folds_core::validation::{NewContactMessage, NewOrder, ProductDraft};
use knots_folds_core::{
    ContactMessage, ContactMessageId, Order, OrderId, OrderStatus, Price, Product, ProductId,
    Timestamp, UserRole,
};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::BackendError;

// =============================================================================
// Response records
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProduct {
    id: u64,
    name: String,
    description: String,
    price: f64,
    stock_quantity: u64,
    image_url: String,
    category: String,
}

impl TryFrom<WireProduct> for Product {
    type Error = BackendError;

    fn try_from(wire: WireProduct) -> Result<Self, Self::Error> {
        let price = Price::from_f64(wire.price)
            .map_err(|e| BackendError::decode("product", format!("product {}: {e}", wire.id)))?;
        Ok(Self {
            id: ProductId::new(wire.id),
            name: wire.name,
            description: wire.description,
            price,
            stock_quantity: wire.stock_quantity,
            image_url: wire.image_url,
            category: wire.category,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    id: u64,
    customer_name: String,
    phone: String,
    address: String,
    product_id: u64,
    quantity: u64,
    status: String,
    timestamp: i64,
}

impl TryFrom<WireOrder> for Order {
    type Error = BackendError;

    fn try_from(wire: WireOrder) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(wire.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                BackendError::decode(
                    "order",
                    format!("order {}: invalid quantity {}", wire.id, wire.quantity),
                )
            })?;
        let status: OrderStatus = wire
            .status
            .parse()
            .map_err(|e| BackendError::decode("order", format!("order {}: {e}", wire.id)))?;
        Ok(Self {
            id: OrderId::new(wire.id),
            customer_name: wire.customer_name,
            phone: wire.phone,
            address: wire.address,
            product_id: ProductId::new(wire.product_id),
            quantity,
            status,
            created_at: Timestamp::from_nanos(wire.timestamp),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContactMessage {
    id: u64,
    name: String,
    email: String,
    message: String,
    timestamp: i64,
}

impl TryFrom<WireContactMessage> for ContactMessage {
    type Error = BackendError;

    fn try_from(wire: WireContactMessage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactMessageId::new(wire.id),
            name: wire.name,
            email: wire.email,
            message: wire.message,
            created_at: Timestamp::from_nanos(wire.timestamp),
        })
    }
}

/// Decode a JSON body into `T`, tagging failures with `what`.
pub fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, BackendError> {
    // Unit results may arrive as an empty body.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| BackendError::decode(what, e))
}

/// Decode a JSON array and convert every element, failing on the first bad record.
pub fn decode_list<W, T>(what: &'static str, body: &str) -> Result<Vec<T>, BackendError>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = BackendError>,
{
    decode::<Vec<W>>(what, body)?
        .into_iter()
        .map(T::try_from)
        .collect()
}

/// Decode a role string (`"admin"`, `"user"`, `"guest"`).
pub fn decode_role(body: &str) -> Result<UserRole, BackendError> {
    let raw: String = decode("caller role", body)?;
    raw.parse()
        .map_err(|e: String| BackendError::decode("caller role", e))
}

// =============================================================================
// Call arguments
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<u64>,
    name: &'a str,
    description: &'a str,
    price: f64,
    stock_quantity: u64,
    image_url: &'a str,
    category: &'a str,
}

impl<'a> ProductArgs<'a> {
    pub fn new(id: Option<ProductId>, draft: &'a ProductDraft) -> Self {
        Self {
            product_id: id.map(|id| id.as_u64()),
            name: &draft.name,
            description: &draft.description,
            price: draft.price.to_f64(),
            stock_quantity: draft.stock_quantity,
            image_url: &draft.image_url,
            category: &draft.category,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderArgs<'a> {
    customer_name: &'a str,
    phone: &'a str,
    address: &'a str,
    product_id: u64,
    quantity: u32,
}

impl<'a> From<&'a NewOrder> for PlaceOrderArgs<'a> {
    fn from(order: &'a NewOrder) -> Self {
        Self {
            customer_name: &order.customer_name,
            phone: &order.phone,
            address: &order.address,
            product_id: order.product_id.as_u64(),
            quantity: order.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusArgs {
    pub order_id: u64,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct SubmitContactArgs<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

impl<'a> From<&'a NewContactMessage> for SubmitContactArgs<'a> {
    fn from(message: &'a NewContactMessage) -> Self {
        Self {
            name: &message.name,
            email: message.email.as_str(),
            message: &message.message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdArgs {
    pub product_id: u64,
}

#[derive(Debug, Serialize)]
pub struct IdArgs {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct NoArgs {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_products() {
        let body = r#"[{"id":7,"name":"Macrame Wall Hanging","description":"Handmade",
            "price":1299.5,"stockQuantity":3,"imageUrl":"","category":"Decor","extra":true}]"#;
        let products: Vec<Product> = decode_list::<WireProduct, _>("products", body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId::new(7));
        assert_eq!(products[0].price.to_string(), "₹1299.50");
        assert_eq!(products[0].stock_quantity, 3);
    }

    #[test]
    fn test_decode_product_negative_price_fails() {
        let body = r#"[{"id":1,"name":"x","description":"y","price":-2.0,
            "stockQuantity":0,"imageUrl":"","category":"c"}]"#;
        let err = decode_list::<WireProduct, Product>("products", body).unwrap_err();
        assert!(matches!(err, BackendError::Decode { what: "product", .. }));
    }

    #[test]
    fn test_decode_product_missing_field_fails() {
        let body = r#"[{"id":1,"name":"x","price":2.0,"stockQuantity":0,"imageUrl":"","category":"c"}]"#;
        let err = decode_list::<WireProduct, Product>("products", body).unwrap_err();
        assert!(matches!(err, BackendError::Decode { what: "products", .. }));
    }

    #[test]
    fn test_decode_order_rejects_zero_quantity_and_unknown_status() {
        let zero = r#"[{"id":42,"customerName":"Asha","phone":"9876543210","address":"Pune",
            "productId":7,"quantity":0,"status":"pending","timestamp":1}]"#;
        assert!(decode_list::<WireOrder, Order>("orders", zero).is_err());

        let unknown = r#"[{"id":42,"customerName":"Asha","phone":"9876543210","address":"Pune",
            "productId":7,"quantity":1,"status":"returned","timestamp":1}]"#;
        assert!(decode_list::<WireOrder, Order>("orders", unknown).is_err());
    }

    #[test]
    fn test_decode_order() {
        let body = r#"[{"id":42,"customerName":"Asha","phone":"9876543210","address":"Pune",
            "productId":7,"quantity":2,"status":"shipped","timestamp":1709647620000000000}]"#;
        let orders: Vec<Order> = decode_list::<WireOrder, _>("orders", body).unwrap();
        assert_eq!(orders[0].id, OrderId::new(42));
        assert_eq!(orders[0].status, OrderStatus::Shipped);
        assert_eq!(orders[0].created_at.as_nanos(), 1_709_647_620_000_000_000);
    }

    #[test]
    fn test_decode_role_and_unit() {
        assert_eq!(decode_role("\"admin\"").unwrap(), UserRole::Admin);
        assert!(decode_role("\"root\"").is_err());
        decode::<()>("deleteProduct", "").unwrap();
        decode::<()>("deleteProduct", "null").unwrap();
    }

    #[test]
    fn test_place_order_args_camel_case() {
        let order = NewOrder {
            customer_name: "Asha".into(),
            phone: "9876543210".into(),
            address: "Pune".into(),
            product_id: ProductId::new(7),
            quantity: 2,
        };
        let json = serde_json::to_value(PlaceOrderArgs::from(&order)).unwrap();
        assert_eq!(json["customerName"], "Asha");
        assert_eq!(json["productId"], 7);
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_product_args_include_id_only_for_updates() {
        let draft = ProductDraft {
            name: "Coaster Set".into(),
            description: "Four coasters".into(),
            price: Price::parse("349.99").unwrap(),
            stock_quantity: 10,
            image_url: String::new(),
            category: "Kitchen".into(),
        };
        let create = serde_json::to_value(ProductArgs::new(None, &draft)).unwrap();
        assert!(create.get("productId").is_none());
        assert_eq!(create["stockQuantity"], 10);

        let update = serde_json::to_value(ProductArgs::new(Some(ProductId::new(3)), &draft)).unwrap();
        assert_eq!(update["productId"], 3);
    }
}
