//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (admin CSP, no caching)
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Login rate limiter (`POST /auth/login` only)
//!
//! Authentication is enforced per handler with the
//! [`RequireAdminAuth`](auth::RequireAdminAuth) extractor.

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdminAuth};
pub use rate_limit::login_rate_limiter;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
