//! Domain models for storefront.
//!
//! Catalog and cart shapes live in `shanga-core`; this module holds the
//! types that only the storefront needs.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys};
pub use user::User;
