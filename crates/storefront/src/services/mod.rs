//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email and password accounts
//! - `cart` - Cart reconciliation over session or database storage
//! - `catalog` - Cached catalog reads
//! - `checkout` - Simulated payment

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
