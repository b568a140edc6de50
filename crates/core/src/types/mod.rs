//! Core types for Shanga.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod owner;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;

pub use cart::{CartLineItem, CartSummary, NewCartLine};
pub use email::{Email, EmailError};
pub use id::*;
pub use owner::OwnerContext;
pub use price::{Price, PriceError};
pub use product::{PLACEHOLDER_IMAGE, Product, UNCATEGORIZED};
pub use quantity::{Quantity, QuantityError};
pub use status::PaymentStatus;
