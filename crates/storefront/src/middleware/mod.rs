//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, signed cookie)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAuth, Owner, RequireAuth, clear_current_user, set_current_user,
};
pub use request_id::request_id_middleware;
