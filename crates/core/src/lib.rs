//! Knots & Folds Core - Shared types library.
//!
//! This crate provides common types used across all Knots & Folds components:
//! - `client` - Backend binding, connection provider and query cache
//! - `storefront` - Public-facing shop site
//! - `admin` - Store management back-office
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, emails, statuses and backend records
//! - [`validation`] - Local form validation with per-field messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
