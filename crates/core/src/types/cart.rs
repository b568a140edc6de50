//! Cart line items and totals.

use serde::{Deserialize, Serialize};

use super::id::{CartLineId, ProductId};
use super::price::Price;
use super::product::Product;
use super::quantity::Quantity;

/// One (product, quantity) pairing owned by a cart.
///
/// Anonymous carts carry an embedded product snapshot and no row id. Lines
/// read from the database carry the row id and a product resolved by join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartLineId>,
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl CartLineItem {
    /// Line total, or zero when no product is attached.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product
            .as_ref()
            .map_or(Price::ZERO, |product| product.price.times(self.quantity))
    }
}

/// A line to be created in a cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Display snapshot. Only stores without a catalog join keep it.
    pub snapshot: Option<Product>,
}

/// A cart read back with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLineItem>,
    /// Number of distinct line items, shown in the navigation badge.
    pub line_count: usize,
    /// Sum of quantities across all lines.
    pub total_quantity: u64,
    pub subtotal: Price,
    /// Shipping is calculated at checkout, so this equals the subtotal.
    pub total: Price,
}

impl CartSummary {
    /// Build a summary from the lines a store returned.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLineItem>) -> Self {
        let subtotal: Price = lines.iter().map(CartLineItem::line_total).sum();
        let total_quantity = lines.iter().map(|l| u64::from(l.quantity.get())).sum();
        Self {
            line_count: lines.len(),
            total_quantity,
            subtotal,
            total: subtotal,
            lines,
        }
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::PLACEHOLDER_IMAGE;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: id.to_owned(),
            price: Price::from_cents(cents).unwrap(),
            image: PLACEHOLDER_IMAGE.to_owned(),
            category: "Jewelry".to_owned(),
            stock: Some(5),
            description: None,
            featured: false,
        }
    }

    fn line(id: &str, qty: i64, product: Option<Product>) -> CartLineItem {
        CartLineItem {
            id: None,
            product_id: ProductId::parse(id).unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            product,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = CartSummary::from_lines(vec![
            line("earrings", 2, Some(product("earrings", 3499))),
            line("necklace", 1, Some(product("necklace", 5999))),
        ]);
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.subtotal, Price::from_cents(12997).unwrap());
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn test_line_without_product_counts_zero() {
        let summary = CartSummary::from_lines(vec![line("ghost", 4, None)]);
        assert_eq!(summary.line_count, 1);
        assert_eq!(summary.subtotal, Price::ZERO);
    }

    #[test]
    fn test_local_wire_shape() {
        let json = serde_json::json!([{ "product_id": "sandal-001", "quantity": 2 }]);
        let lines: Vec<CartLineItem> = serde_json::from_value(json).unwrap();
        assert_eq!(lines[0].product_id.as_str(), "sandal-001");
        assert_eq!(lines[0].quantity.get(), 2);
        assert!(lines[0].product.is_none());
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::from_lines(Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.subtotal, Price::ZERO);
    }
}
