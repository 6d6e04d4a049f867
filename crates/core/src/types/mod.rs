//! Core types for Knots & Folds.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the records exchanged with the backend.

pub mod email;
pub mod entity;
pub mod id;
pub mod price;
pub mod status;
pub mod timestamp;

pub use email::{Email, EmailError};
pub use entity::{ContactMessage, Order, Product, sort_newest_first};
pub use id::*;
pub use price::{CURRENCY_SYMBOL, Price, PriceError};
pub use status::*;
pub use timestamp::Timestamp;
