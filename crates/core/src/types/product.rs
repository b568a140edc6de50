//! Flat product display shape.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Image shown when a product has no image of its own.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Category label for products without a resolvable category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A product as shown to shoppers.
///
/// The catalog stores categories separately; this is the denormalized view
/// with the category already resolved to its name. Anonymous carts embed a
/// copy of it so they can render without a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Image to display, falling back to [`PLACEHOLDER_IMAGE`] when blank.
    #[must_use]
    pub fn image_or_placeholder(image: Option<String>) -> String {
        image
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned())
    }

    /// Category to display, falling back to [`UNCATEGORIZED`] when absent.
    #[must_use]
    pub fn category_or_default(category: Option<String>) -> String {
        category
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_owned())
    }

    /// Whether the product can currently be bought.
    ///
    /// Products without stock tracking are always available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }
}
