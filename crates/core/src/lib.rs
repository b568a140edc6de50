//! Shanga Core - Shared types library.
//!
//! This crate provides common types used across all Shanga components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout)
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, emails, and the
//!   cart / catalog shapes shared by every store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
