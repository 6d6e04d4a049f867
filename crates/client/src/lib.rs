//! Knots & Folds Client - Backend binding and query cache.
//!
//! Everything the two web servers need to talk to the shop backend:
//!
//! - [`backend`] - The [`Backend`](backend::Backend) trait, its HTTP binding
//!   and (with the `testing` feature) an in-memory implementation
//! - [`connection`] - Process-wide provider of the current backend handle
//! - [`sync`] - Keyed read cache with in-flight sharing and mutation-driven
//!   invalidation
//! - [`queries`] - Typed reads and writes over the sync layer, one per
//!   backend operation
//! - [`config`] - Backend settings and environment helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod connection;
pub mod queries;
pub mod sync;

pub use backend::{Backend, BackendError, BackendHandle, HttpBackend};
pub use config::{BackendConfig, ConfigError, SentryConfig};
pub use connection::{ConnectError, ConnectionProvider};
pub use sync::{QueryKey, QueryState, SyncContext, SyncError};

#[cfg(any(test, feature = "testing"))]
pub use backend::MemoryBackend;
