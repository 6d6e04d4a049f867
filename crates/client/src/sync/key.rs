//! Cache keys and the values stored under them.

use std::fmt;
use std::sync::Arc;

use knots_folds_core::{ContactMessage, Order, Product, UserRole};

/// Stable identifier of a cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    /// All products
    Products,
    /// All orders
    Orders,
    /// All contact messages
    ContactMessages,
    /// Role of the calling principal
    CallerRole,
    /// Whether the calling principal is an admin
    IsCallerAdmin,
}

impl QueryKey {
    pub const ALL: [Self; 5] = [
        Self::Products,
        Self::Orders,
        Self::ContactMessages,
        Self::CallerRole,
        Self::IsCallerAdmin,
    ];

    /// Name used in logs and live-update event streams.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::ContactMessages => "contactMessages",
            Self::CallerRole => "callerRole",
            Self::IsCallerAdmin => "isCallerAdmin",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached values, one variant per key shape.
///
/// Lists are shared so cloning an entry out of the cache is cheap.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Orders(Arc<Vec<Order>>),
    ContactMessages(Arc<Vec<ContactMessage>>),
    CallerRole(UserRole),
    IsCallerAdmin(bool),
}

/// A value that can be read through the cache.
///
/// `Default` is what callers see before the first successful fetch: an empty
/// list, [`UserRole::Guest`] or `false`.
pub trait QueryValue: Clone + Default + Send + Sync + 'static {
    fn into_cache(self) -> CacheValue;

    /// `None` if `value` holds a different shape.
    fn from_cache(value: &CacheValue) -> Option<Self>;
}

impl QueryValue for Vec<Product> {
    fn into_cache(self) -> CacheValue {
        CacheValue::Products(Arc::new(self))
    }

    fn from_cache(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::Products(products) => Some(products.as_ref().clone()),
            _ => None,
        }
    }
}

impl QueryValue for Vec<Order> {
    fn into_cache(self) -> CacheValue {
        CacheValue::Orders(Arc::new(self))
    }

    fn from_cache(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::Orders(orders) => Some(orders.as_ref().clone()),
            _ => None,
        }
    }
}

impl QueryValue for Vec<ContactMessage> {
    fn into_cache(self) -> CacheValue {
        CacheValue::ContactMessages(Arc::new(self))
    }

    fn from_cache(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::ContactMessages(messages) => Some(messages.as_ref().clone()),
            _ => None,
        }
    }
}

impl QueryValue for UserRole {
    fn into_cache(self) -> CacheValue {
        CacheValue::CallerRole(self)
    }

    fn from_cache(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::CallerRole(role) => Some(*role),
            _ => None,
        }
    }
}

impl QueryValue for bool {
    fn into_cache(self) -> CacheValue {
        CacheValue::IsCallerAdmin(self)
    }

    fn from_cache(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::IsCallerAdmin(flag) => Some(*flag),
            _ => None,
        }
    }
}
